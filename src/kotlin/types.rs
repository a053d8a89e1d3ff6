//! Kotlin types and type arguments.
//!
//! A [`TypeInfo`] is a recursive tree: arguments are projections over further types, and a
//! type may carry its abbreviation, its outer type and a flexible upper bound. Rewriting
//! walks the whole tree; star projections are copied without visiting anything.

use crate::{
    host::TypeRef,
    km::{KmFlexibleTypeUpperBound, KmType, KmTypeProjection, KmVariance},
    kotlin::{AnnotationInfo, ClassifierInfo, ReadContext, RewriteContext},
};

/// A Kotlin type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    flags: u32,
    classifier: ClassifierInfo,
    arguments: Vec<TypeProjectionInfo>,
    abbreviated_type: Option<Box<TypeInfo>>,
    outer_type: Option<Box<TypeInfo>>,
    flexible_upper_bound: Option<FlexibleUpperBoundInfo>,
    is_raw: bool,
    annotations: Vec<AnnotationInfo>,
}

/// A type argument. Both parts `None` is `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeProjectionInfo {
    variance: Option<KmVariance>,
    ty: Option<TypeInfo>,
}

/// Upper bound of a flexible platform type.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexibleUpperBoundInfo {
    ty: Box<TypeInfo>,
    type_flexibility_id: Option<String>,
}

impl TypeInfo {
    /// Builds the Info for a decoded type.
    pub fn create(ty: &KmType, ctx: &ReadContext) -> Self {
        TypeInfo {
            flags: ty.flags,
            classifier: ClassifierInfo::create(&ty.classifier, ctx),
            arguments: ty
                .arguments
                .iter()
                .map(|arg| TypeProjectionInfo::create(arg, ctx))
                .collect(),
            abbreviated_type: ty
                .abbreviated_type
                .as_ref()
                .map(|t| Box::new(TypeInfo::create(t, ctx))),
            outer_type: ty
                .outer_type
                .as_ref()
                .map(|t| Box::new(TypeInfo::create(t, ctx))),
            flexible_upper_bound: ty.flexible_type_upper_bound.as_ref().map(|bound| {
                FlexibleUpperBoundInfo {
                    ty: Box::new(TypeInfo::create(&bound.ty, ctx)),
                    type_flexibility_id: bound.type_flexibility_id.clone(),
                }
            }),
            is_raw: ty.is_raw,
            annotations: AnnotationInfo::create_all(&ty.annotations),
        }
    }

    /// Builds the Infos for a list of types.
    pub fn create_all(types: &[KmType], ctx: &ReadContext) -> Vec<Self> {
        types.iter().map(|t| TypeInfo::create(t, ctx)).collect()
    }

    /// The classifier.
    #[must_use]
    pub fn classifier(&self) -> &ClassifierInfo {
        &self.classifier
    }

    /// Rewrites the type.
    ///
    /// When the classifier was pruned and replaced by `kotlin/Any`, the type arguments are
    /// dropped with it.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmType, bool) {
        let classifier = self.classifier.rewrite(ctx);
        let mut changed = classifier.changed;
        let mut ty = KmType::new(self.flags, classifier.classifier);

        if !classifier.fell_back {
            for argument in &self.arguments {
                let (projection, argument_changed) = argument.rewrite(ctx);
                changed |= argument_changed;
                ty.arguments.push(projection);
            }
        }
        if let Some(abbreviated) = &self.abbreviated_type {
            let (abbreviated, c) = abbreviated.rewrite(ctx);
            changed |= c;
            ty.abbreviated_type = Some(Box::new(abbreviated));
        }
        if let Some(outer) = &self.outer_type {
            let (outer, c) = outer.rewrite(ctx);
            changed |= c;
            ty.outer_type = Some(Box::new(outer));
        }
        if let Some(bound) = &self.flexible_upper_bound {
            let (upper, c) = bound.ty.rewrite(ctx);
            changed |= c;
            ty.flexible_type_upper_bound = Some(KmFlexibleTypeUpperBound {
                ty: Box::new(upper),
                type_flexibility_id: bound.type_flexibility_id.clone(),
            });
        }
        ty.is_raw = self.is_raw;
        let (annotations, c) = AnnotationInfo::rewrite_all(&self.annotations, ctx);
        ty.annotations = annotations;
        (ty, changed | c)
    }

    /// Rewrites an optional type.
    pub fn rewrite_opt(ty: Option<&Self>, ctx: &RewriteContext) -> (Option<KmType>, bool) {
        match ty {
            Some(ty) => {
                let (ty, changed) = ty.rewrite(ctx);
                (Some(ty), changed)
            }
            None => (None, false),
        }
    }

    /// Rewrites a list of types.
    pub fn rewrite_all(types: &[Self], ctx: &RewriteContext) -> (Vec<KmType>, bool) {
        let mut changed = false;
        let out = types
            .iter()
            .map(|t| {
                let (ty, c) = t.rewrite(ctx);
                changed |= c;
                ty
            })
            .collect();
        (out, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.classifier.trace(f);
        for argument in &self.arguments {
            if let Some(ty) = &argument.ty {
                ty.trace(f);
            }
        }
        if let Some(abbreviated) = &self.abbreviated_type {
            abbreviated.trace(f);
        }
        if let Some(outer) = &self.outer_type {
            outer.trace(f);
        }
        if let Some(bound) = &self.flexible_upper_bound {
            bound.ty.trace(f);
        }
        for annotation in &self.annotations {
            annotation.trace(f);
        }
    }
}

impl TypeProjectionInfo {
    /// Builds the Info for a decoded projection.
    pub fn create(projection: &KmTypeProjection, ctx: &ReadContext) -> Self {
        TypeProjectionInfo {
            variance: projection.variance,
            ty: projection.ty.as_ref().map(|t| TypeInfo::create(t, ctx)),
        }
    }

    /// Returns `true` for `*`.
    #[must_use]
    pub fn is_star(&self) -> bool {
        self.variance.is_none() && self.ty.is_none()
    }

    /// Rewrites the projection.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmTypeProjection, bool) {
        if self.is_star() {
            return (KmTypeProjection::STAR, false);
        }
        let (ty, changed) = TypeInfo::rewrite_opt(self.ty.as_ref(), ctx);
        (
            KmTypeProjection {
                variance: self.variance,
                ty,
            },
            changed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{MappingSymbolTable, MethodRef},
        km::KmClassifier,
    };

    fn list_of(element: KmType) -> KmType {
        let mut ty = KmType::class("foo/MyList");
        ty.arguments.push(KmTypeProjection::new(KmVariance::Out, element));
        ty.arguments.push(KmTypeProjection::STAR);
        ty
    }

    fn create(ty: &KmType) -> TypeInfo {
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let ctx = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        TypeInfo::create(ty, &ctx)
    }

    #[test]
    fn test_identity_round_trip() {
        let mut km = list_of(KmType::new(1, KmClassifier::TypeParameter(0)));
        km.abbreviated_type = Some(Box::new(KmType::new(
            0,
            KmClassifier::TypeAlias("foo/Alias".to_string()),
        )));
        let info = create(&km);

        let table = MappingSymbolTable::new();
        let diagnostics = Diagnostics::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (rewritten, changed) = info.rewrite(&ctx);
        assert!(!changed);
        assert_eq!(rewritten, km);
    }

    #[test]
    fn test_nested_renaming() {
        let info = create(&list_of(KmType::class("foo/Element")));
        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/Element;"), TypeRef::new("Lx/E;"));
        let diagnostics = Diagnostics::new();
        let ctx = RewriteContext::new(&table, &diagnostics);

        let (rewritten, changed) = info.rewrite(&ctx);
        assert!(changed);
        assert_eq!(rewritten.classifier, KmClassifier::Class("foo/MyList".to_string()));
        let inner = rewritten.arguments[0].ty.as_ref().unwrap();
        assert_eq!(inner.classifier, KmClassifier::Class("x/E".to_string()));
        assert!(rewritten.arguments[1].is_star());
    }

    #[test]
    fn test_pruned_outer_drops_arguments() {
        let info = create(&list_of(KmType::class("foo/Element")));
        let table = MappingSymbolTable::new();
        table.prune(TypeRef::new("Lfoo/MyList;"));
        let diagnostics = Diagnostics::new();
        let ctx = RewriteContext::new(&table, &diagnostics);

        let (rewritten, changed) = info.rewrite(&ctx);
        assert!(changed);
        assert_eq!(rewritten.classifier, KmClassifier::Class("kotlin/Any".to_string()));
        assert!(rewritten.arguments.is_empty());

        let mut traced = Vec::new();
        info.trace(&mut |ty| traced.push(ty.clone()));
        assert_eq!(
            traced,
            vec![TypeRef::new("Lfoo/MyList;"), TypeRef::new("Lfoo/Element;")]
        );
    }
}
