//! Human-readable rendering of decoded metadata trees.
//!
//! Used by hosts that dump class files and by tests that compare trees textually.
//! Functions, properties and constructors are printed in JVM-signature order (falling back
//! to the declared name) so that two trees holding the same declarations in a different
//! order render identically.

use std::fmt::{self, Write};

use crate::km::{
    KmAnnotation, KmAnnotationArgument, KmClass, KmConstructor, KmContract, KmEffectExpression,
    KmFunction, KmPackage, KmProperty, KmType, KmTypeAlias, KmTypeParameter, KmValueParameter,
    KmVersionRequirement, KotlinClassMetadata,
};

const INDENT: &str = "  ";

struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: impl fmt::Display) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        let _ = writeln!(self.out, "{text}");
    }

    fn field(&mut self, key: &str, value: impl fmt::Display) {
        self.line(format_args!("{key}: {value},"));
    }

    fn opt_field<T: fmt::Display>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.field(key, value);
        }
    }

    fn section(&mut self, name: &str, body: impl FnOnce(&mut Self)) {
        self.line(format_args!("{name} {{"));
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line("}");
    }

    fn list<T>(&mut self, key: &str, items: &[T], mut item: impl FnMut(&mut Self, &T)) {
        if items.is_empty() {
            return;
        }
        self.line(format_args!("{key}: ["));
        self.depth += 1;
        for value in items {
            item(self, value);
        }
        self.depth -= 1;
        self.line("],");
    }

    fn strings(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.field(key, format_args!("[{}]", items.join(", ")));
        }
    }

    fn ty(&mut self, key: &str, ty: &KmType) {
        self.line(format_args!("{key}: {},", render_type(ty)));
    }

    fn type_parameters(&mut self, params: &[KmTypeParameter]) {
        self.list("typeParameters", params, |p, param| {
            p.section("KmTypeParameter", |p| {
                p.field("id", param.id);
                p.field("name", &param.name);
                p.field("flags", param.flags);
                p.field("variance", format_args!("{:?}", param.variance));
                p.list("upperBounds", &param.upper_bounds, |p, bound| {
                    p.line(format_args!("{},", render_type(bound)));
                });
                p.annotations(&param.annotations);
            });
        });
    }

    fn value_parameters(&mut self, params: &[KmValueParameter]) {
        self.list("valueParameters", params, |p, param| {
            p.section("KmValueParameter", |p| {
                p.field("name", &param.name);
                p.field("flags", param.flags);
                p.ty("type", &param.ty);
                if let Some(vararg) = &param.vararg_element_type {
                    p.ty("varargElementType", vararg);
                }
            });
        });
    }

    fn annotations(&mut self, annotations: &[KmAnnotation]) {
        self.list("annotations", annotations, |p, annotation| {
            p.line(format_args!("{},", render_annotation(annotation)));
        });
    }

    fn context_receivers(&mut self, types: &[KmType]) {
        self.list("contextReceiverTypes", types, |p, ty| {
            p.line(format_args!("{},", render_type(ty)));
        });
    }

    fn version_requirements(&mut self, requirements: &[KmVersionRequirement]) {
        self.list("versionRequirements", requirements, |p, req| {
            p.line(format_args!(
                "{:?} {:?} {}.{}.{} (code {:?}, message {:?}),",
                req.kind,
                req.level,
                req.version.major,
                req.version.minor,
                req.version.patch,
                req.error_code,
                req.message
            ));
        });
    }

    fn function(&mut self, function: &KmFunction) {
        self.section("KmFunction", |p| {
            p.field("name", &function.name);
            p.field("flags", function.flags);
            p.opt_field(
                "signature",
                function.signature.as_ref().map(|s| s.as_string()),
            );
            p.opt_field("lambdaClassOriginName", function.lambda_class_origin_name.as_ref());
            if let Some(receiver) = &function.receiver_parameter_type {
                p.ty("receiverParameterType", receiver);
            }
            p.context_receivers(&function.context_receiver_types);
            p.type_parameters(&function.type_parameters);
            p.value_parameters(&function.value_parameters);
            p.ty("returnType", &function.return_type);
            if let Some(contract) = &function.contract {
                p.contract(contract);
            }
            p.version_requirements(&function.version_requirements);
        });
    }

    fn contract(&mut self, contract: &KmContract) {
        self.section("KmContract", |p| {
            p.list("effects", &contract.effects, |p, effect| {
                p.section("KmEffect", |p| {
                    p.field("type", format_args!("{:?}", effect.effect_type));
                    p.opt_field(
                        "invocationKind",
                        effect.invocation_kind.map(|k| format!("{k:?}")),
                    );
                    p.list("constructorArguments", &effect.constructor_arguments, |p, e| {
                        p.effect_expression(e);
                    });
                    if let Some(conclusion) = &effect.conclusion {
                        p.line("conclusion:");
                        p.effect_expression(conclusion);
                    }
                });
            });
        });
    }

    fn effect_expression(&mut self, expression: &KmEffectExpression) {
        self.section("KmEffectExpression", |p| {
            p.field("flags", expression.flags);
            p.opt_field("parameterIndex", expression.parameter_index);
            p.opt_field(
                "constantValue",
                expression.constant_value.map(|c| format!("{c:?}")),
            );
            if let Some(ty) = &expression.is_instance_type {
                p.ty("isInstanceType", ty);
            }
            p.list("andArguments", &expression.and_arguments, |p, e| {
                p.effect_expression(e);
            });
            p.list("orArguments", &expression.or_arguments, |p, e| {
                p.effect_expression(e);
            });
        });
    }

    fn property(&mut self, property: &KmProperty) {
        self.section("KmProperty", |p| {
            p.field("name", &property.name);
            p.field("flags", property.flags);
            p.field("getterFlags", property.getter_flags);
            p.field("setterFlags", property.setter_flags);
            p.field("jvmFlags", property.jvm_flags);
            p.opt_field(
                "fieldSignature",
                property.field_signature.as_ref().map(|s| s.as_string()),
            );
            p.opt_field(
                "getterSignature",
                property.getter_signature.as_ref().map(|s| s.as_string()),
            );
            p.opt_field(
                "setterSignature",
                property.setter_signature.as_ref().map(|s| s.as_string()),
            );
            p.opt_field(
                "syntheticMethodForAnnotations",
                property
                    .synthetic_method_for_annotations
                    .as_ref()
                    .map(|s| s.as_string()),
            );
            p.opt_field(
                "syntheticMethodForDelegate",
                property
                    .synthetic_method_for_delegate
                    .as_ref()
                    .map(|s| s.as_string()),
            );
            if let Some(receiver) = &property.receiver_parameter_type {
                p.ty("receiverParameterType", receiver);
            }
            p.context_receivers(&property.context_receiver_types);
            p.type_parameters(&property.type_parameters);
            if let Some(setter) = &property.setter_parameter {
                p.value_parameters(std::slice::from_ref(setter));
            }
            p.ty("returnType", &property.return_type);
            p.version_requirements(&property.version_requirements);
        });
    }

    fn constructor(&mut self, constructor: &KmConstructor) {
        self.section("KmConstructor", |p| {
            p.field("flags", constructor.flags);
            p.opt_field(
                "signature",
                constructor.signature.as_ref().map(|s| s.as_string()),
            );
            p.value_parameters(&constructor.value_parameters);
            p.version_requirements(&constructor.version_requirements);
        });
    }

    fn type_alias(&mut self, alias: &KmTypeAlias) {
        self.section("KmTypeAlias", |p| {
            p.field("name", &alias.name);
            p.field("flags", alias.flags);
            p.type_parameters(&alias.type_parameters);
            p.ty("underlyingType", &alias.underlying_type);
            p.ty("expandedType", &alias.expanded_type);
            p.annotations(&alias.annotations);
            p.version_requirements(&alias.version_requirements);
        });
    }

    fn declarations(
        &mut self,
        functions: &[KmFunction],
        properties: &[KmProperty],
        type_aliases: &[KmTypeAlias],
    ) {
        let mut functions: Vec<_> = functions.iter().collect();
        functions.sort_by_key(|f| function_key(f));
        self.list("functions", &functions, |p, f| p.function(f));

        let mut properties: Vec<_> = properties.iter().collect();
        properties.sort_by_key(|prop| property_key(prop));
        self.list("properties", &properties, |p, prop| p.property(prop));

        self.list("typeAliases", type_aliases, |p, alias| p.type_alias(alias));
    }

    fn package(&mut self, package: &KmPackage) {
        self.declarations(&package.functions, &package.properties, &package.type_aliases);
        self.opt_field("moduleName", package.module_name.as_ref());
        self.list(
            "localDelegatedProperties",
            &package.local_delegated_properties,
            |p, prop| p.property(prop),
        );
    }

    fn class(&mut self, class: &KmClass) {
        self.field("flags", class.flags);
        self.field("jvmFlags", class.jvm_flags);
        self.field("name", &class.name);
        self.opt_field("companionObject", class.companion_object.as_ref());
        self.opt_field(
            "anonymousObjectOriginName",
            class.anonymous_object_origin_name.as_ref(),
        );
        self.opt_field("moduleName", class.module_name.as_ref());
        self.opt_field(
            "inlineClassUnderlyingPropertyName",
            class.inline_class_underlying_property_name.as_ref(),
        );
        if let Some(ty) = &class.inline_class_underlying_type {
            self.ty("inlineClassUnderlyingType", ty);
        }
        self.type_parameters(&class.type_parameters);
        self.list("supertypes", &class.supertypes, |p, ty| {
            p.line(format_args!("{},", render_type(ty)));
        });
        self.context_receivers(&class.context_receiver_types);
        self.strings("nestedClasses", &class.nested_classes);
        self.strings("enumEntries", &class.enum_entries);
        self.strings("sealedSubclasses", &class.sealed_subclasses);

        let mut constructors: Vec<_> = class.constructors.iter().collect();
        constructors.sort_by_key(|c| c.signature.as_ref().map(|s| s.as_string()));
        self.list("constructors", &constructors, |p, c| p.constructor(c));

        self.declarations(&class.functions, &class.properties, &class.type_aliases);
        self.list(
            "localDelegatedProperties",
            &class.local_delegated_properties,
            |p, prop| p.property(prop),
        );
        self.version_requirements(&class.version_requirements);
    }
}

fn function_key(function: &KmFunction) -> String {
    function
        .signature
        .as_ref()
        .map_or_else(|| function.name.clone(), |s| s.as_string())
}

fn property_key(property: &KmProperty) -> String {
    property
        .field_signature
        .as_ref()
        .map(|s| s.as_string())
        .or_else(|| property.getter_signature.as_ref().map(|s| s.as_string()))
        .unwrap_or_else(|| property.name.clone())
}

/// Renders a type on one line, e.g. `kotlin/collections/Map<out K, *>?`.
#[must_use]
pub fn render_type(ty: &KmType) -> String {
    let mut out = match &ty.classifier {
        crate::km::KmClassifier::Class(name) => name.clone(),
        crate::km::KmClassifier::TypeParameter(id) => format!("T#{id}"),
        crate::km::KmClassifier::TypeAlias(name) => format!("typealias {name}"),
        crate::km::KmClassifier::Unrecognized(name) => format!("?{name}"),
    };
    if !ty.arguments.is_empty() {
        let args: Vec<String> = ty
            .arguments
            .iter()
            .map(|arg| match (&arg.variance, &arg.ty) {
                (Some(variance), Some(inner)) => match variance {
                    crate::km::KmVariance::Invariant => render_type(inner),
                    crate::km::KmVariance::In => format!("in {}", render_type(inner)),
                    crate::km::KmVariance::Out => format!("out {}", render_type(inner)),
                },
                _ => "*".to_string(),
            })
            .collect();
        let _ = write!(out, "<{}>", args.join(", "));
    }
    if ty.flags & 1 != 0 {
        out.push('?');
    }
    if let Some(upper) = &ty.flexible_type_upper_bound {
        let _ = write!(out, "..{}", render_type(&upper.ty));
    }
    if ty.is_raw {
        out.push_str(" (raw)");
    }
    out
}

fn render_argument(argument: &KmAnnotationArgument) -> String {
    match argument {
        KmAnnotationArgument::Byte(v) => v.to_string(),
        KmAnnotationArgument::Char(v) => format!("'{v}'"),
        KmAnnotationArgument::Short(v) => v.to_string(),
        KmAnnotationArgument::Int(v) => v.to_string(),
        KmAnnotationArgument::Long(v) => format!("{v}L"),
        KmAnnotationArgument::Float(v) => format!("{v}f"),
        KmAnnotationArgument::Double(v) => v.to_string(),
        KmAnnotationArgument::Boolean(v) => v.to_string(),
        KmAnnotationArgument::UByte(v) => format!("{v}u"),
        KmAnnotationArgument::UShort(v) => format!("{v}u"),
        KmAnnotationArgument::UInt(v) => format!("{v}u"),
        KmAnnotationArgument::ULong(v) => format!("{v}uL"),
        KmAnnotationArgument::String(v) => format!("{v:?}"),
        KmAnnotationArgument::KClass {
            class_name,
            array_dimension_count,
        } => {
            let mut out = format!("{class_name}::class");
            for _ in 0..*array_dimension_count {
                out = format!("Array<{out}>");
            }
            out
        }
        KmAnnotationArgument::Enum {
            enum_class_name,
            enum_entry_name,
        } => format!("{enum_class_name}.{enum_entry_name}"),
        KmAnnotationArgument::Annotation(annotation) => render_annotation(annotation),
        KmAnnotationArgument::Array(values) => format!(
            "[{}]",
            values
                .iter()
                .map(render_argument)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn render_annotation(annotation: &KmAnnotation) -> String {
    let args: Vec<String> = annotation
        .arguments
        .iter()
        .map(|(name, value)| format!("{name} = {}", render_argument(value)))
        .collect();
    format!("@{}({})", annotation.class_name, args.join(", "))
}

impl fmt::Display for KotlinClassMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut p = Printer::new();
        match self {
            KotlinClassMetadata::Class(class) => p.section("Class", |p| p.class(class)),
            KotlinClassMetadata::FileFacade(package) => {
                p.section("FileFacade", |p| p.package(package));
            }
            KotlinClassMetadata::SyntheticClass(lambda) => p.section("SyntheticClass", |p| {
                match lambda {
                    Some(lambda) => p.section("KmLambda", |p| p.function(&lambda.function)),
                    None => p.line("null"),
                }
            }),
            KotlinClassMetadata::MultiFileClassPart {
                facade_class_name,
                package,
            } => p.section("MultiFileClassPart", |p| {
                p.field("facadeClassName", facade_class_name);
                p.package(package);
            }),
            KotlinClassMetadata::MultiFileClassFacade(parts) => {
                p.section("MultiFileClassFacade", |p| p.strings("partClassNames", parts));
            }
        }
        f.write_str(&p.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::km::{JvmMethodSignature, KmClassifier, KmTypeProjection, KmVariance};

    #[test]
    fn test_render_type() {
        let mut ty = KmType::class("kotlin/collections/Map");
        ty.arguments.push(KmTypeProjection::new(
            KmVariance::Out,
            KmType::new(0, KmClassifier::TypeParameter(0)),
        ));
        ty.arguments.push(KmTypeProjection::STAR);
        ty.flags = 1;
        assert_eq!(render_type(&ty), "kotlin/collections/Map<out T#0, *>?");
    }

    #[test]
    fn test_functions_sorted_by_signature() {
        let mut b = KmFunction::new(0, "b", KmType::class("kotlin/Unit"));
        b.signature = Some(JvmMethodSignature::new("b", "()V"));
        let mut a = KmFunction::new(0, "a", KmType::class("kotlin/Unit"));
        a.signature = Some(JvmMethodSignature::new("a", "()V"));

        let first = KotlinClassMetadata::FileFacade(KmPackage {
            functions: vec![b.clone(), a.clone()],
            ..KmPackage::default()
        });
        let second = KotlinClassMetadata::FileFacade(KmPackage {
            functions: vec![a, b],
            ..KmPackage::default()
        });
        let text = first.to_string();
        assert_eq!(text, second.to_string());
        assert!(text.starts_with("FileFacade {"));
        assert!(text.find("a()V").unwrap() < text.find("b()V").unwrap());
    }

    #[test]
    fn test_facade() {
        let text =
            KotlinClassMetadata::MultiFileClassFacade(vec!["foo/A__X".to_string()]).to_string();
        assert!(text.contains("partClassNames: [foo/A__X],"));
    }
}
