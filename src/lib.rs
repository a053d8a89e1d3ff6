// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # ktmeta
//!
//! Reading, remapping and re-serialization of Kotlin `@Metadata` for JVM bytecode shrinkers
//! and optimizers.
//!
//! Every class compiled by the Kotlin compiler carries a `kotlin.Metadata` annotation that
//! describes its Kotlin-level declarations: functions, properties, constructors, type
//! aliases, nested classes, and more, each with the JVM signature of the member that
//! implements it. Once a shrinker has renamed, merged or removed classes and members, that
//! annotation is stale. `ktmeta` keeps it consistent.
//!
//! ## Features
//!
//! - **Binding** - Kotlin declarations are bound to the bytecode members that implement
//!   them by exact JVM signature; declarations without a member are kept, not lost
//! - **Rewriting** - every type name, member name and signature is rewritten through the
//!   host's symbol table; references to removed classes degrade to `kotlin/Any` or
//!   `java/lang/Object`
//! - **Change detection** - unchanged metadata is never re-encoded
//! - **Failure containment** - malformed metadata of one class never fails the build
//! - **Parallel** - both passes run on rayon
//!
//! ## Architecture
//!
//! - [`host`] - what the crate needs from the host compiler: types, members, program
//!   classes, the symbol table and the keep-byte-code callback
//! - [`km`] - the raw `@Metadata` header, the decoded declaration tree and the codec
//!   boundary
//! - [`kotlin`] - the Info model: binding, dispatch by class kind, and rewriting
//! - [`rewriter`] - [`KotlinMetadataRewriter`], the read and write passes over all classes
//! - [`diagnostics`] and [`config`] - reporting and options
//! - [`Error`] and [`Result`] - error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use ktmeta::prelude::*;
//!
//! let codec = MemoryCodec::new();
//! let metadata = KotlinClassMetadata::Class(KmClass {
//!     name: "foo/Greeter".to_string(),
//!     ..KmClass::default()
//! });
//! let header = codec.encode(&metadata, &[1, 8, 0])?;
//! let ty = TypeRef::new("Lfoo/Greeter;");
//! let mut classes = vec![ProgramClass::new(ty.clone())
//!     .with_annotation(header.to_annotation(&RewriterConfig::default()))];
//!
//! let rewriter = KotlinMetadataRewriter::new(&codec);
//! rewriter.read_kotlin_metadata(&mut classes, &|_: &MethodRef| {})?;
//!
//! let symbols = MappingSymbolTable::new();
//! symbols.rename_type(ty, TypeRef::new("La;"));
//! let summary = rewriter.rewrite_kotlin_metadata(&mut classes, &symbols);
//! assert_eq!(summary.rewritten, 1);
//! # Ok::<(), ktmeta::Error>(())
//! ```

#[macro_use]
pub(crate) mod error;

pub mod config;
pub mod diagnostics;
pub mod host;
pub mod km;
pub mod kotlin;
pub mod prelude;
pub mod rewriter;

#[cfg(test)]
pub(crate) mod test;

/// `ktmeta` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `ktmeta` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// The two-pass metadata rewriter.
pub use rewriter::KotlinMetadataRewriter;
