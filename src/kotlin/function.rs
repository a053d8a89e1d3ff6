use crate::{
    host::{MethodRef, TypeRef},
    km::{flags::FunctionFlags, KmFunction},
    kotlin::{
        ContractInfo, JvmMethodSignatureInfo, ReadContext, RewriteContext, TypeInfo,
        TypeParameterInfo, TypeReference, ValueParameterInfo, VersionRequirementInfo,
    },
};

/// A Kotlin function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    flags: u32,
    name: String,
    return_type: TypeInfo,
    receiver_parameter_type: Option<TypeInfo>,
    value_parameters: Vec<ValueParameterInfo>,
    type_parameters: Vec<TypeParameterInfo>,
    context_receiver_types: Vec<TypeInfo>,
    version_requirements: VersionRequirementInfo,
    signature: Option<JvmMethodSignatureInfo>,
    lambda_class_origin: Option<TypeReference>,
    contract: Option<ContractInfo>,
    has_crossinline_parameter: bool,
}

impl FunctionInfo {
    /// Builds the Info for a decoded function.
    pub fn create(function: &KmFunction, ctx: &ReadContext) -> Self {
        let value_parameters = ValueParameterInfo::create_all(&function.value_parameters, ctx);
        let has_crossinline_parameter = value_parameters.iter().any(ValueParameterInfo::is_crossinline);
        FunctionInfo {
            flags: function.flags,
            name: function.name.clone(),
            return_type: TypeInfo::create(&function.return_type, ctx),
            receiver_parameter_type: function
                .receiver_parameter_type
                .as_ref()
                .map(|t| TypeInfo::create(t, ctx)),
            value_parameters,
            type_parameters: TypeParameterInfo::create_all(&function.type_parameters, ctx),
            context_receiver_types: TypeInfo::create_all(&function.context_receiver_types, ctx),
            version_requirements: VersionRequirementInfo::create(&function.version_requirements),
            signature: function.signature.as_ref().map(JvmMethodSignatureInfo::create),
            lambda_class_origin: function
                .lambda_class_origin_name
                .as_deref()
                .map(TypeReference::from_binary_name),
            contract: function.contract.as_ref().map(|c| ContractInfo::create(c, ctx)),
            has_crossinline_parameter,
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JVM signature, if the function carries the JVM extension.
    #[must_use]
    pub fn signature(&self) -> Option<&JvmMethodSignatureInfo> {
        self.signature.as_ref()
    }

    /// Returns `true` for `inline fun`.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        FunctionFlags::of(self.flags).contains(FunctionFlags::IS_INLINE)
    }

    /// Returns `true` if any value parameter is `crossinline`.
    #[must_use]
    pub fn has_crossinline_parameter(&self) -> bool {
        self.has_crossinline_parameter
    }

    /// Number of declared value parameters.
    #[must_use]
    pub fn value_parameter_count(&self) -> usize {
        self.value_parameters.len()
    }

    /// Returns `true` if some parameter declares a default value.
    #[must_use]
    pub fn has_default_values(&self) -> bool {
        self.value_parameters
            .iter()
            .any(ValueParameterInfo::declares_default_value)
    }

    /// Rewrites the function.
    ///
    /// `method` is the bytecode method the function was bound to, `None` for unbacked
    /// functions. A renamed method renames the function.
    pub fn rewrite(&self, method: Option<&MethodRef>, ctx: &RewriteContext) -> (KmFunction, bool) {
        let mut changed = false;
        let mut name = self.name.clone();
        if let Some(method) = method {
            if let Some(renamed) = ctx.lookup_method(method) {
                if renamed.name != method.name {
                    changed = true;
                    name = renamed.name;
                }
            }
        }

        let (return_type, c) = self.return_type.rewrite(ctx);
        changed |= c;
        let mut function = KmFunction::new(self.flags, name, return_type);

        let (receiver, c) = TypeInfo::rewrite_opt(self.receiver_parameter_type.as_ref(), ctx);
        changed |= c;
        function.receiver_parameter_type = receiver;

        let (context_receivers, c) = TypeInfo::rewrite_all(&self.context_receiver_types, ctx);
        changed |= c;
        function.context_receiver_types = context_receivers;

        let (type_parameters, c) = TypeParameterInfo::rewrite_all(&self.type_parameters, ctx);
        changed |= c;
        function.type_parameters = type_parameters;

        let (value_parameters, c) = ValueParameterInfo::rewrite_all(&self.value_parameters, ctx);
        changed |= c;
        function.value_parameters = value_parameters;

        function.version_requirements = self.version_requirements.rewrite();

        if let Some(signature) = &self.signature {
            let (signature, c) = signature.rewrite(method, ctx);
            changed |= c;
            function.signature = Some(signature);
        }

        if let Some(origin) = &self.lambda_class_origin {
            let (origin, c) = origin.rewrite(ctx);
            changed |= c;
            function.lambda_class_origin_name = origin;
        }

        if let Some(contract) = &self.contract {
            let (contract, c) = contract.rewrite(ctx);
            changed |= c;
            function.contract = Some(contract);
        }

        (function, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.return_type.trace(f);
        if let Some(receiver) = &self.receiver_parameter_type {
            receiver.trace(f);
        }
        for ty in &self.context_receiver_types {
            ty.trace(f);
        }
        for param in &self.type_parameters {
            param.trace(f);
        }
        for param in &self.value_parameters {
            param.trace(f);
        }
        if let Some(signature) = &self.signature {
            signature.trace(f);
        }
        if let Some(origin) = &self.lambda_class_origin {
            origin.trace(f);
        }
        if let Some(contract) = &self.contract {
            contract.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::MappingSymbolTable,
        km::{JvmMethodSignature, KmType, KmValueParameter},
    };

    fn function() -> KmFunction {
        let mut function = KmFunction::new(
            FunctionFlags::IS_INLINE.bits(),
            "transform",
            KmType::class("foo/Result"),
        );
        function.value_parameters.push(KmValueParameter {
            flags: 1 << 2,
            name: "block".to_string(),
            ty: KmType::class("kotlin/Function0"),
            vararg_element_type: None,
        });
        function.signature = Some(JvmMethodSignature::new(
            "transform",
            "(Lkotlin/jvm/functions/Function0;)Lfoo/Result;",
        ));
        function.lambda_class_origin_name = Some("foo/Gone$lambda".to_string());
        function
    }

    #[test]
    fn test_flags() {
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        let info = FunctionInfo::create(&function(), &read);
        assert!(info.is_inline());
        assert!(info.has_crossinline_parameter());
        assert!(!info.has_default_values());
        assert_eq!(info.value_parameter_count(), 1);
    }

    #[test]
    fn test_rewrite_with_member() {
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        let info = FunctionInfo::create(&function(), &read);

        let method = MethodRef::new(
            TypeRef::new("LHost;"),
            "transform",
            vec![TypeRef::new("Lkotlin/jvm/functions/Function0;")],
            TypeRef::new("Lfoo/Result;"),
        );
        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = info.rewrite(Some(&method), &ctx);
        assert!(!changed);
        assert_eq!(same, function());

        table.rename_method(method.clone(), "t");
        table.prune(TypeRef::new("Lfoo/Gone$lambda;"));
        let (renamed, changed) = info.rewrite(Some(&method), &ctx);
        assert!(changed);
        assert_eq!(renamed.name, "t");
        assert_eq!(
            renamed.signature.unwrap().as_string(),
            "t(Lkotlin/jvm/functions/Function0;)Lfoo/Result;"
        );
        assert!(renamed.lambda_class_origin_name.is_none());

        let (unbacked, _) = info.rewrite(None, &ctx);
        assert_eq!(unbacked.name, "transform");
    }
}
