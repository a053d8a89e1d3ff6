//! Interface to the host compiler's bytecode graph.
//!
//! The metadata layer treats the host as an external collaborator. This module defines the
//! shape it expects:
//!
//! - [`TypeRef`], [`MethodRef`], [`FieldRef`] - identity of types and members
//! - [`ProgramClass`] and its members - one class body plus the slots the read pass fills
//! - [`SymbolTable`] - renaming, pruning and keep decisions
//! - [`ByteCodeKeeper`] - callback for members whose instructions must survive shrinking
//! - [`descriptor`] - conversions between descriptors, binary names and Kotlin classifiers

pub mod descriptor;
mod program;
mod symbols;
mod types;

pub use program::{
    Annotation, AnnotationElement, AnnotationValue, ProgramClass, ProgramField, ProgramMethod,
};
pub use symbols::{ByteCodeKeeper, MappingSymbolTable, SymbolTable};
pub use types::{FieldRef, MethodRef, TypeRef};
