//! What a Kotlin type refers to.

use crate::{
    diagnostics::DiagnosticCategory,
    host::{descriptor::KOTLIN_ANY_CLASSIFIER, TypeRef},
    km::KmClassifier,
    kotlin::{ReadContext, RewriteContext, TypeReference},
};

/// Prefix marking local and anonymous class names in Kotlin classifiers.
const LOCAL_CLASS_PREFIX: char = '.';

/// The classifier of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierInfo {
    /// A class bound to a host type.
    Class {
        /// The class.
        ty: TypeReference,
        /// The name was written with a leading `.`.
        is_local_or_anonymous: bool,
    },
    /// A type parameter of an enclosing declaration.
    TypeParameter(u32),
    /// A type alias, kept by name.
    TypeAlias(String),
    /// A class name that does not parse; written back verbatim.
    UnknownClass(String),
    /// A classifier shape the codec could not map; written back verbatim.
    UnknownClassifier(String),
}

/// Result of rewriting a classifier.
pub(crate) struct RewrittenClassifier {
    pub(crate) classifier: KmClassifier,
    pub(crate) changed: bool,
    /// The class was pruned and replaced by `kotlin/Any`.
    pub(crate) fell_back: bool,
}

impl ClassifierInfo {
    /// Builds the classifier Info for a decoded classifier.
    pub fn create(classifier: &KmClassifier, ctx: &ReadContext) -> Self {
        match classifier {
            KmClassifier::Class(name) => {
                // Local and anonymous class names are binary names behind the prefix.
                let (is_local_or_anonymous, ty) = match name.strip_prefix(LOCAL_CLASS_PREFIX) {
                    Some(stripped) => (true, TypeReference::from_binary_name(stripped)),
                    None => (false, TypeReference::from_kotlin_classifier(name)),
                };
                if ty.known().is_some() {
                    ClassifierInfo::Class {
                        ty,
                        is_local_or_anonymous,
                    }
                } else {
                    ClassifierInfo::UnknownClass(name.clone())
                }
            }
            KmClassifier::TypeParameter(id) => ClassifierInfo::TypeParameter(*id),
            KmClassifier::TypeAlias(name) => ClassifierInfo::TypeAlias(name.clone()),
            KmClassifier::Unrecognized(name) => {
                ctx.warning(
                    DiagnosticCategory::Classifier,
                    format!("Unknown classifier '{name}' in Kotlin metadata"),
                );
                ClassifierInfo::UnknownClassifier(name.clone())
            }
        }
    }

    pub(crate) fn rewrite(&self, ctx: &RewriteContext) -> RewrittenClassifier {
        let verbatim = |classifier: KmClassifier| RewrittenClassifier {
            classifier,
            changed: false,
            fell_back: false,
        };
        match self {
            ClassifierInfo::Class {
                ty,
                is_local_or_anonymous,
            } => {
                let (name, changed, fell_back) = match ty.rewrite(ctx) {
                    (Some(name), changed) => (name, changed, false),
                    (None, _) => (KOTLIN_ANY_CLASSIFIER.to_string(), true, true),
                };
                let name = if *is_local_or_anonymous && !fell_back {
                    format!("{LOCAL_CLASS_PREFIX}{name}")
                } else {
                    name
                };
                RewrittenClassifier {
                    classifier: KmClassifier::Class(name),
                    changed,
                    fell_back,
                }
            }
            ClassifierInfo::TypeParameter(id) => verbatim(KmClassifier::TypeParameter(*id)),
            ClassifierInfo::TypeAlias(name) => verbatim(KmClassifier::TypeAlias(name.clone())),
            ClassifierInfo::UnknownClass(name) => verbatim(KmClassifier::Class(name.clone())),
            ClassifierInfo::UnknownClassifier(name) => {
                verbatim(KmClassifier::Unrecognized(name.clone()))
            }
        }
    }

    /// The post-shrink class this classifier names, if it is a surviving class.
    pub(crate) fn rewritten_class(&self, ctx: &RewriteContext) -> Option<TypeRef> {
        match self {
            ClassifierInfo::Class { ty, .. } => ty.rewritten_type(ctx),
            _ => None,
        }
    }

    /// Reports the referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let ClassifierInfo::Class { ty, .. } = self {
            ty.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::Diagnostics, host::MappingSymbolTable, kotlin::ReadContext};

    fn read(classifier: &KmClassifier, diagnostics: &Diagnostics) -> ClassifierInfo {
        let keeper = |_: &crate::host::MethodRef| {};
        let ctx = ReadContext::new(&keeper, diagnostics, TypeRef::new("LHost;"));
        ClassifierInfo::create(classifier, &ctx)
    }

    #[test]
    fn test_local_class_keeps_prefix() {
        let diagnostics = Diagnostics::new();
        let info = read(&KmClassifier::Class(".foo/Bar$1".to_string()), &diagnostics);
        assert!(matches!(
            info,
            ClassifierInfo::Class {
                is_local_or_anonymous: true,
                ..
            }
        ));

        let table = MappingSymbolTable::new();
        table.rename_type(TypeRef::new("Lfoo/Bar$1;"), TypeRef::new("La;"));
        let ctx = RewriteContext::new(&table, &diagnostics);
        let rewritten = info.rewrite(&ctx);
        assert_eq!(rewritten.classifier, KmClassifier::Class(".a".to_string()));
        assert!(rewritten.changed);
    }

    #[test]
    fn test_local_classifier_identity() {
        let diagnostics = Diagnostics::new();
        let info = read(
            &KmClassifier::Class(".foo/Bar$run$1".to_string()),
            &diagnostics,
        );
        let mut traced = Vec::new();
        info.trace(&mut |ty| traced.push(ty.clone()));
        assert_eq!(traced, vec![TypeRef::new("Lfoo/Bar$run$1;")]);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let rewritten = info.rewrite(&ctx);
        assert_eq!(
            rewritten.classifier,
            KmClassifier::Class(".foo/Bar$run$1".to_string())
        );
        assert!(!rewritten.changed);

        table.rename_type(TypeRef::new("Lfoo/Bar$run$1;"), TypeRef::new("La$b$1;"));
        let rewritten = info.rewrite(&ctx);
        assert_eq!(rewritten.classifier, KmClassifier::Class(".a$b$1".to_string()));
        assert!(rewritten.changed);
    }

    #[test]
    fn test_pruned_falls_back_to_any() {
        let diagnostics = Diagnostics::new();
        let info = read(&KmClassifier::Class("foo/Gone".to_string()), &diagnostics);
        let table = MappingSymbolTable::new();
        table.prune(TypeRef::new("Lfoo/Gone;"));
        let ctx = RewriteContext::new(&table, &diagnostics);
        let rewritten = info.rewrite(&ctx);
        assert_eq!(rewritten.classifier, KmClassifier::Class("kotlin/Any".to_string()));
        assert!(rewritten.changed);
        assert!(rewritten.fell_back);
    }

    #[test]
    fn test_unknown_variants_pass_through() {
        let diagnostics = Diagnostics::new();
        let info = read(&KmClassifier::Class("not;valid".to_string()), &diagnostics);
        assert_eq!(info, ClassifierInfo::UnknownClass("not;valid".to_string()));

        let info = read(&KmClassifier::Unrecognized("Intersection".to_string()), &diagnostics);
        assert_eq!(
            info,
            ClassifierInfo::UnknownClassifier("Intersection".to_string())
        );
        assert_eq!(diagnostics.warning_count(), 1);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let rewritten = info.rewrite(&ctx);
        assert!(!rewritten.changed);
        assert_eq!(
            rewritten.classifier,
            KmClassifier::Unrecognized("Intersection".to_string())
        );
    }
}
