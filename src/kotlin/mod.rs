//! The Kotlin Info model: binding of decoded metadata to bytecode members and rewriting.
//!
//! Every node of a decoded metadata tree has an Info counterpart. An Info is created once,
//! when the class is read, from the decoded node and a [`ReadContext`]. It keeps every type
//! name as a [`TypeReference`] into the host's type graph, and every declaration that has a
//! bytecode counterpart is bound to it through the member slots of the
//! [`crate::host::ProgramClass`]. After the host has shrunk and renamed the program, each
//! Info writes a new decoded node through a [`RewriteContext`], reporting whether anything
//! differs from what was read.
//!
//! # Architecture
//!
//! - **Leaves**: [`TypeReference`], [`ClassifierInfo`], [`TypeInfo`], [`AnnotationInfo`],
//!   signatures and the other building blocks rewrite themselves and never fail
//! - **Declarations**: [`FunctionInfo`], [`PropertyInfo`], [`ConstructorInfo`] and
//!   [`TypeAliasInfo`] combine the leaves
//! - **Containers**: [`DeclarationContainerInfo`] binds declarations to members via the
//!   [`SymbolIndex`] and regroups surviving members at write time
//! - **Class level**: [`ClassInfo`], [`FileFacadeInfo`], [`SyntheticClassInfo`],
//!   [`MultiFileClassPartInfo`] and [`MultiFileClassFacadeInfo`], selected by
//!   [`read_kotlin_info`] and stored as a [`KotlinClassLevelInfo`]
//!
//! # Rewrite protocol
//!
//! Every `rewrite` returns the produced node (or `None` where the node can disappear)
//! together with a `changed` flag. The flag is `true` exactly when the produced node
//! differs from the node the Info was created from, so the caller can leave unchanged
//! metadata byte for byte as it was.
//!
//! # Thread Safety
//!
//! Infos are immutable after creation and shared through [`std::sync::Arc`] between the
//! member slots of one class. Each class is read and rewritten by one task at a time.

mod annotation;
mod class;
mod classifier;
mod constructor;
mod container;
mod context;
mod contract;
mod delegated;
mod dispatch;
mod facade;
mod function;
mod index;
mod lambda;
mod members;
mod property;
mod signature;
mod typealias;
mod typeparam;
mod typeref;
mod types;
mod valueparam;
mod version;

pub use annotation::{AnnotationArgumentInfo, AnnotationInfo};
pub use class::ClassInfo;
pub use classifier::ClassifierInfo;
pub use constructor::ConstructorInfo;
pub use container::{ContainerDeclarations, DeclarationContainerInfo};
pub use context::{ReadContext, RewriteContext};
pub use contract::{ContractInfo, EffectExpressionInfo, EffectInfo};
pub use delegated::LocalDelegatedPropertiesInfo;
pub use dispatch::{read_kotlin_info, KotlinClassLevelInfo, MetadataOrigin};
pub use facade::{FileFacadeInfo, MultiFileClassFacadeInfo, MultiFileClassPartInfo, PackageInfo};
pub use function::FunctionInfo;
pub use index::SymbolIndex;
pub use lambda::{LambdaInfo, SyntheticClassInfo};
pub use members::{
    CompanionInfo, EnumEntryInfo, KotlinFieldLevelInfo, KotlinMethodLevelInfo, MembersTracker,
};
pub use property::{PropertyInfo, PropertyParts};
pub use signature::{JvmFieldSignatureInfo, JvmMethodSignatureInfo};
pub use typealias::TypeAliasInfo;
pub use typeparam::TypeParameterInfo;
pub use typeref::{NameSyntax, TypeReference};
pub use types::{FlexibleUpperBoundInfo, TypeInfo, TypeProjectionInfo};
pub use valueparam::ValueParameterInfo;
pub use version::VersionRequirementInfo;
