//! Function contracts: `returns`, `callsInPlace` and their boolean conditions.

use crate::{
    host::TypeRef,
    km::{
        KmConstantValue, KmContract, KmEffect, KmEffectExpression, KmEffectInvocationKind,
        KmEffectType,
    },
    kotlin::{ReadContext, RewriteContext, TypeInfo},
};

/// A function contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInfo {
    effects: Vec<EffectInfo>,
}

/// One contract effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectInfo {
    effect_type: KmEffectType,
    invocation_kind: Option<KmEffectInvocationKind>,
    constructor_arguments: Vec<EffectExpressionInfo>,
    conclusion: Option<EffectExpressionInfo>,
}

/// A condition tree inside an effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectExpressionInfo {
    flags: u32,
    parameter_index: Option<u32>,
    constant_value: Option<KmConstantValue>,
    is_instance_type: Option<TypeInfo>,
    and_arguments: Vec<EffectExpressionInfo>,
    or_arguments: Vec<EffectExpressionInfo>,
}

impl ContractInfo {
    /// Builds the Info for a decoded contract.
    pub fn create(contract: &KmContract, ctx: &ReadContext) -> Self {
        ContractInfo {
            effects: contract
                .effects
                .iter()
                .map(|e| EffectInfo::create(e, ctx))
                .collect(),
        }
    }

    /// Rewrites the contract.
    pub fn rewrite(&self, ctx: &RewriteContext) -> (KmContract, bool) {
        let mut changed = false;
        let effects = self
            .effects
            .iter()
            .map(|e| {
                let (effect, c) = e.rewrite(ctx);
                changed |= c;
                effect
            })
            .collect();
        (KmContract { effects }, changed)
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        for effect in &self.effects {
            for argument in &effect.constructor_arguments {
                argument.trace(f);
            }
            if let Some(conclusion) = &effect.conclusion {
                conclusion.trace(f);
            }
        }
    }
}

impl EffectInfo {
    fn create(effect: &KmEffect, ctx: &ReadContext) -> Self {
        EffectInfo {
            effect_type: effect.effect_type,
            invocation_kind: effect.invocation_kind,
            constructor_arguments: EffectExpressionInfo::create_all(
                &effect.constructor_arguments,
                ctx,
            ),
            conclusion: effect
                .conclusion
                .as_ref()
                .map(|c| EffectExpressionInfo::create(c, ctx)),
        }
    }

    fn rewrite(&self, ctx: &RewriteContext) -> (KmEffect, bool) {
        let (constructor_arguments, mut changed) =
            EffectExpressionInfo::rewrite_all(&self.constructor_arguments, ctx);
        let conclusion = self.conclusion.as_ref().map(|c| {
            let (conclusion, c) = c.rewrite(ctx);
            changed |= c;
            conclusion
        });
        (
            KmEffect {
                effect_type: self.effect_type,
                invocation_kind: self.invocation_kind,
                constructor_arguments,
                conclusion,
            },
            changed,
        )
    }
}

impl EffectExpressionInfo {
    fn create(expression: &KmEffectExpression, ctx: &ReadContext) -> Self {
        EffectExpressionInfo {
            flags: expression.flags,
            parameter_index: expression.parameter_index,
            constant_value: expression.constant_value,
            is_instance_type: expression
                .is_instance_type
                .as_ref()
                .map(|t| TypeInfo::create(t, ctx)),
            and_arguments: Self::create_all(&expression.and_arguments, ctx),
            or_arguments: Self::create_all(&expression.or_arguments, ctx),
        }
    }

    fn create_all(expressions: &[KmEffectExpression], ctx: &ReadContext) -> Vec<Self> {
        expressions.iter().map(|e| Self::create(e, ctx)).collect()
    }

    fn rewrite(&self, ctx: &RewriteContext) -> (KmEffectExpression, bool) {
        let (is_instance_type, type_changed) =
            TypeInfo::rewrite_opt(self.is_instance_type.as_ref(), ctx);
        let (and_arguments, and_changed) = Self::rewrite_all(&self.and_arguments, ctx);
        let (or_arguments, or_changed) = Self::rewrite_all(&self.or_arguments, ctx);
        (
            KmEffectExpression {
                flags: self.flags,
                parameter_index: self.parameter_index,
                constant_value: self.constant_value,
                is_instance_type,
                and_arguments,
                or_arguments,
            },
            type_changed | and_changed | or_changed,
        )
    }

    fn rewrite_all(expressions: &[Self], ctx: &RewriteContext) -> (Vec<KmEffectExpression>, bool) {
        let mut changed = false;
        let out = expressions
            .iter()
            .map(|e| {
                let (expression, c) = e.rewrite(ctx);
                changed |= c;
                expression
            })
            .collect();
        (out, changed)
    }

    fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        if let Some(ty) = &self.is_instance_type {
            ty.trace(f);
        }
        for e in self.and_arguments.iter().chain(&self.or_arguments) {
            e.trace(f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::Diagnostics,
        host::{MappingSymbolTable, MethodRef},
        km::KmType,
    };

    #[test]
    fn test_is_instance_renamed() {
        let contract = KmContract {
            effects: vec![KmEffect {
                effect_type: KmEffectType::ReturnsConstant,
                invocation_kind: None,
                constructor_arguments: vec![],
                conclusion: Some(KmEffectExpression {
                    flags: 0,
                    parameter_index: Some(1),
                    constant_value: None,
                    is_instance_type: Some(KmType::class("foo/Target")),
                    and_arguments: vec![],
                    or_arguments: vec![],
                }),
            }],
        };
        let keeper = |_: &MethodRef| {};
        let diagnostics = Diagnostics::new();
        let read = ReadContext::new(&keeper, &diagnostics, TypeRef::new("LHost;"));
        let info = ContractInfo::create(&contract, &read);

        let table = MappingSymbolTable::new();
        let ctx = RewriteContext::new(&table, &diagnostics);
        let (same, changed) = info.rewrite(&ctx);
        assert!(!changed);
        assert_eq!(same, contract);

        table.rename_type(TypeRef::new("Lfoo/Target;"), TypeRef::new("La;"));
        let (renamed, changed) = info.rewrite(&ctx);
        assert!(changed);
        let conclusion = renamed.effects[0].conclusion.as_ref().unwrap();
        assert_eq!(
            conclusion.is_instance_type.as_ref().unwrap().classifier,
            crate::km::KmClassifier::Class("a".to_string())
        );
    }
}
