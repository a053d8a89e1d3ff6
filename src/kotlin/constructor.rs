use crate::{
    host::{MethodRef, TypeRef},
    km::KmConstructor,
    kotlin::{
        JvmMethodSignatureInfo, ReadContext, RewriteContext, ValueParameterInfo,
        VersionRequirementInfo,
    },
};

/// A Kotlin constructor. Bound to a bytecode `<init>` by exact signature only.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInfo {
    flags: u32,
    value_parameters: Vec<ValueParameterInfo>,
    version_requirements: VersionRequirementInfo,
    signature: Option<JvmMethodSignatureInfo>,
}

impl ConstructorInfo {
    /// Builds the Info for a decoded constructor.
    pub fn create(constructor: &KmConstructor, ctx: &ReadContext) -> Self {
        ConstructorInfo {
            flags: constructor.flags,
            value_parameters: ValueParameterInfo::create_all(&constructor.value_parameters, ctx),
            version_requirements: VersionRequirementInfo::create(
                &constructor.version_requirements,
            ),
            signature: constructor
                .signature
                .as_ref()
                .map(JvmMethodSignatureInfo::create),
        }
    }

    /// The JVM signature, if present.
    #[must_use]
    pub fn signature(&self) -> Option<&JvmMethodSignatureInfo> {
        self.signature.as_ref()
    }

    /// Rewrites the constructor; `method` is the bound `<init>`, if any.
    pub fn rewrite(&self, method: Option<&MethodRef>, ctx: &RewriteContext) -> (KmConstructor, bool) {
        let (value_parameters, mut changed) =
            ValueParameterInfo::rewrite_all(&self.value_parameters, ctx);
        let signature = self.signature.as_ref().map(|signature| {
            let (signature, c) = signature.rewrite(method, ctx);
            changed |= c;
            signature
        });
        (
            KmConstructor {
                flags: self.flags,
                value_parameters,
                version_requirements: self.version_requirements.rewrite(),
                signature,
            },
            changed,
        )
    }

    /// Reports every referenced class.
    pub fn trace(&self, f: &mut dyn FnMut(&TypeRef)) {
        for param in &self.value_parameters {
            param.trace(f);
        }
        if let Some(signature) = &self.signature {
            signature.trace(f);
        }
    }
}
