use crate::{
    host::TypeRef,
    km::{KmTypeParameter, KmVariance},
    kotlin::{AnnotationInfo, ReadContext, RewriteContext, TypeInfo},
};

/// A type parameter of a class, function, property or type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameterInfo {
    flags: u32,
    name: String,
    id: u32,
    variance: KmVariance,
    upper_bounds: Vec<TypeInfo>,
    annotations: Vec<AnnotationInfo>,
}

impl TypeParameterInfo {
    /// Builds the Info for a decoded type parameter.
    pub fn create(param: &KmTypeParameter, ctx: &ReadContext) -> Self {
        TypeParameterInfo {
            flags: param.flags,
            name: param.name.clone(),
            id: param.id,
            variance: param.variance,
            upper_bounds: TypeInfo::create_all(&param.upper_bounds, ctx),
            annotations: AnnotationInfo::create_all(&param.annotations),
        }
    }

    /// Builds the Infos for a list of type parameters.
    pub fn create_all(params: &[KmTypeParameter], ctx: &ReadContext) -> Vec<Self> {
        params.iter().map(|p| Self::create(p, ctx)).collect()
    }

    /// The id other types refer to this parameter by.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Rewrites the type parameter.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmTypeParameter, bool) {
        let (upper_bounds, bounds_changed) = TypeInfo::rewrite_all(&self.upper_bounds, ctx);
        let (annotations, annotations_changed) = AnnotationInfo::rewrite_all(&self.annotations, ctx);
        (
            KmTypeParameter {
                flags: self.flags,
                name: self.name.clone(),
                id: self.id,
                variance: self.variance,
                upper_bounds,
                annotations,
            },
            bounds_changed | annotations_changed,
        )
    }

    /// Rewrites a list of type parameters.
    pub fn rewrite_all(params: &[Self], ctx: &RewriteContext) -> (Vec<KmTypeParameter>, bool) {
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
        for bound in &self.upper_bounds {
            bound.trace(f);
        }
        for annotation in &self.annotations {
            annotation.trace(f);
        }
    }
}
