use crate::{
    host::TypeRef,
    km::{flags::ValueParameterFlags, KmValueParameter},
    kotlin::{ReadContext, RewriteContext, TypeInfo},
};

/// A value parameter of a function, constructor or setter.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueParameterInfo {
    flags: u32,
    name: String,
    ty: TypeInfo,
    vararg_element_type: Option<TypeInfo>,
}

impl ValueParameterInfo {
    /// Builds the Info for a decoded value parameter.
    pub fn create(param: &KmValueParameter, ctx: &ReadContext) -> Self {
        ValueParameterInfo {
            flags: param.flags,
            name: param.name.clone(),
            ty: TypeInfo::create(&param.ty, ctx),
            vararg_element_type: param
                .vararg_element_type
                .as_ref()
                .map(|t| TypeInfo::create(t, ctx)),
        }
    }

    /// Builds the Infos for a list of value parameters.
    pub fn create_all(params: &[KmValueParameter], ctx: &ReadContext) -> Vec<Self> {
        params.iter().map(|p| Self::create(p, ctx)).collect()
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for `vararg` parameters.
    #[must_use]
    pub fn is_vararg(&self) -> bool {
        self.vararg_element_type.is_some()
    }

    /// Returns `true` if the parameter declares a default value.
    #[must_use]
    pub fn declares_default_value(&self) -> bool {
        ValueParameterFlags::of(self.flags).contains(ValueParameterFlags::DECLARES_DEFAULT_VALUE)
    }

    /// Returns `true` for `crossinline` parameters.
    #[must_use]
    pub fn is_crossinline(&self) -> bool {
        ValueParameterFlags::of(self.flags).contains(ValueParameterFlags::IS_CROSSINLINE)
    }

    /// Rewrites the parameter.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmValueParameter, bool) {
        let (ty, type_changed) = self.ty.rewrite(ctx);
        let (vararg_element_type, vararg_changed) =
            TypeInfo::rewrite_opt(self.vararg_element_type.as_ref(), ctx);
        (
            KmValueParameter {
                flags: self.flags,
                name: self.name.clone(),
                ty,
                vararg_element_type,
            },
            type_changed | vararg_changed,
        )
    }

    /// Rewrites a list of parameters.
    pub fn rewrite_all(params: &[Self], ctx: &RewriteContext) -> (Vec<KmValueParameter>, bool) {
        let mut changed = false;
        let out = params
            .iter()
            .map(|p| {
                let (param, c) = p.rewrite(ctx);
                changed |= c;
                param
            })
            .collect();
        (out, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.ty.trace(f);
        if let Some(vararg) = &self.vararg_element_type {
            vararg.trace(f);
        }
    }
}
