//! The `std` module: built-in scalars, `std::Object` and std functions.

use edgeql_core::{Cardinality, QualifiedName, std_types};

use crate::builder::SchemaBuilder;
use crate::entries::{FunctionEntry, ParamEntry, ParamKind, ParamType, ReturnType, ScalarKind};

const SCALARS: [(&str, ScalarKind); 6] = [
    ("bool", ScalarKind::Bool),
    ("int", ScalarKind::Int),
    ("float", ScalarKind::Float),
    ("str", ScalarKind::Str),
    ("uuid", ScalarKind::Uuid),
    ("datetime", ScalarKind::Datetime),
];

/// Populate `builder` with the std module. The builder must be empty.
pub(crate) fn register(builder: &mut SchemaBuilder) {
    builder.module("std");
    for (name, kind) in SCALARS {
        // A fresh builder has no names to collide with.
        let _ = builder.insert_scalar(QualifiedName::new("std", name), kind, None);
    }
    let _ = builder.object_type("std::Object").register();

    for function in std_functions() {
        let _ = builder.function(function);
    }
}

fn std_functions() -> Vec<FunctionEntry> {
    vec![
        aggregate("count", ParamType::Any, ReturnType::Concrete(std_types::INT), Cardinality::One),
        aggregate("sum", ParamType::Numeric, ReturnType::SameAsArg(0), Cardinality::One),
        aggregate("min", ParamType::Any, ReturnType::SameAsArg(0), Cardinality::AtMostOne),
        aggregate("max", ParamType::Any, ReturnType::SameAsArg(0), Cardinality::AtMostOne),
        element_wise("len", std_types::STR, std_types::INT),
        element_wise("lower", std_types::STR, std_types::STR),
        element_wise("upper", std_types::STR, std_types::STR),
    ]
}

fn aggregate(
    name: &str,
    ty: ParamType,
    return_type: ReturnType,
    return_cardinality: Cardinality,
) -> FunctionEntry {
    FunctionEntry {
        name: QualifiedName::new("std", name),
        params: vec![ParamEntry {
            name: "s".into(),
            ty,
            kind: ParamKind::SetOf,
        }],
        return_type,
        return_cardinality,
    }
}

fn element_wise(
    name: &str,
    param: edgeql_core::TypeId,
    ret: edgeql_core::TypeId,
) -> FunctionEntry {
    FunctionEntry {
        name: QualifiedName::new("std", name),
        params: vec![ParamEntry {
            name: "s".into(),
            ty: ParamType::Concrete(param),
            kind: ParamKind::Singleton,
        }],
        return_type: ReturnType::Concrete(ret),
        return_cardinality: Cardinality::One,
    }
}
