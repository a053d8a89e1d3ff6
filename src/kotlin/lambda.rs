//! Synthetic classes (`k = 3`) and the lambdas some of them carry.

use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticCategory,
    host::{ProgramClass, TypeRef},
    km::KmLambda,
    kotlin::{
        FunctionInfo, KotlinMethodLevelInfo, MetadataOrigin, ReadContext, RewriteContext,
        SymbolIndex,
    },
};

/// The function of a lambda class, bound to its `invoke` implementation when found.
#[derive(Debug, Clone)]
pub struct LambdaInfo {
    function: Arc<FunctionInfo>,
    has_backing: bool,
}

impl LambdaInfo {
    /// Builds the lambda info and binds its function to a method of `class`.
    pub fn create(lambda: &KmLambda, class: &mut ProgramClass, ctx: &ReadContext) -> Self {
        let index = SymbolIndex::new(class);
        let function = Arc::new(FunctionInfo::create(&lambda.function, ctx));
        let position = function
            .signature()
            .and_then(|signature| index.method(&signature.as_string()))
            .filter(|&position| {
                let bound = class.methods[position].kotlin_info.is_bound();
                if bound {
                    ctx.warning(
                        DiagnosticCategory::Read,
                        format!(
                            "Lambda function '{}' shares its member with another declaration",
                            function.name()
                        ),
                    );
                }
                !bound
            });
        if let Some(position) = position {
            class.methods[position].kotlin_info =
                KotlinMethodLevelInfo::Function(Arc::clone(&function));
        }
        LambdaInfo {
            function,
            has_backing: position.is_some(),
        }
    }

    /// Returns `true` if the function was bound to a method.
    #[must_use]
    pub fn has_backing(&self) -> bool {
        self.has_backing
    }

    /// Rewrites the lambda.
    ///
    /// A backed lambda whose method did not survive is written unbacked and reported as
    /// changed.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (KmLambda, bool) {
        let method = class
            .methods
            .iter()
            .filter(|m| {
                m.kotlin_info
                    .as_function()
                    .is_some_and(|f| Arc::ptr_eq(f, &self.function))
            })
            .map(|m| &m.reference)
            .find(|reference| ctx.lookup_method(reference).is_some());

        let (function, mut changed) = self.function.rewrite(method, ctx);
        if self.has_backing && method.is_none() {
            changed = true;
        }
        (KmLambda { function }, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        self.function.trace(f);
    }
}

/// The Kotlin info of a synthetic class.
#[derive(Debug, Clone)]
pub struct SyntheticClassInfo {
    origin: MetadataOrigin,
    lambda: Option<LambdaInfo>,
}

impl SyntheticClassInfo {
    /// Builds the info of a synthetic class, binding its lambda if it has one.
    pub fn create(
        lambda: Option<&KmLambda>,
        origin: MetadataOrigin,
        class: &mut ProgramClass,
        ctx: &ReadContext,
    ) -> Self {
        SyntheticClassInfo {
            origin,
            lambda: lambda.map(|lambda| LambdaInfo::create(lambda, class, ctx)),
        }
    }

    /// The header fields the class was read with.
    #[must_use]
    pub fn origin(&self) -> &MetadataOrigin {
        &self.origin
    }

    /// Returns `true` for lambda classes.
    #[must_use]
    pub fn is_lambda(&self) -> bool {
        self.lambda.is_some()
    }

    /// Rewrites the synthetic class.
    pub fn rewrite(&self, class: &ProgramClass, ctx: &RewriteContext) -> (Option<KmLambda>, bool) {
        match &self.lambda {
            Some(lambda) => {
                let (lambda, changed) = lambda.rewrite(class, ctx);
                (Some(lambda), changed)
            }
            None => (None, false),
        }
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let Some(lambda) = &self.lambda {
            lambda.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{MappingSymbolTable, MethodRef},
        km::{JvmMethodSignature, KmFunction, KmType},
    };

    fn lambda_class() -> ProgramClass {
        let ty = TypeRef::new("Lfoo/Host$run$1;");
        ProgramClass::new(ty.clone()).with_method(
            MethodRef::new(ty, "invoke", vec![], TypeRef::new("V")),
            false,
        )
    }

    fn lambda() -> KmLambda {
        let mut function = KmFunction::new(0, "<anonymous>", KmType::class("kotlin/Unit"));
        function.signature = Some(JvmMethodSignature::new("invoke", "()V"));
        KmLambda { function }
    }

    #[test]
    fn test_lambda_binding() {
        let mut class = lambda_class();
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, class.ty.clone());
        let info = SyntheticClassInfo::create(
            Some(&lambda()),
            MetadataOrigin::default(),
            &mut class,
            &read,
        );
        assert!(info.is_lambda());
        assert!(class.methods[0].kotlin_info.as_function().is_some());

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = info.rewrite(&class, &ctx);
        assert!(!changed);
        assert_eq!(same, Some(lambda()));

        table.prune_method(class.methods[0].reference.clone());
        let (rewritten, changed) = info.rewrite(&class, &ctx);
        assert!(changed);
        assert_eq!(rewritten.unwrap().function.name, "<anonymous>");
    }

    #[test]
    fn test_bound_invoke_not_taken_over() {
        let mut class = lambda_class();
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, class.ty.clone());
        let first = LambdaInfo::create(&lambda(), &mut class, &read);
        let second = LambdaInfo::create(&lambda(), &mut class, &read);

        assert!(first.has_backing());
        assert!(!second.has_backing());
        let bound = class.methods[0].kotlin_info.as_function().unwrap();
        assert!(Arc::ptr_eq(bound, &first.function));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_non_lambda_synthetic_class() {
        let mut class = lambda_class();
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, class.ty.clone());
        let info = SyntheticClassInfo::create(None, MetadataOrigin::default(), &mut class, &read);
        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        assert_eq!(info.rewrite(&class, &ctx), (None, false));
    }
}
