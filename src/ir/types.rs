//! Type lowering (§4.E "Type lowering"). The five primitive mappings and the
//! structural `Array τ → {i64, τ'*}` encoding are exactly as specified; the
//! handful of DataLang types the lowering section is silent on (`Custom`,
//! `Tuple`, `Function`, `DataFrame`/`Vector`/`Series`) are lowered to the closest
//! shape the runtime's opaque-handle contract already implies (§6): a record or
//! a dataframe/vector/series value is always passed around as an opaque `i8*`
//! handle produced and consumed by the runtime, never unpacked in emitted IR.
use crate::types::Type;

/// The textual LLVM type for a DataLang `Type`.
pub fn lower_type(ty: &Type) -> String {
    match ty {
        Type::Int => "i64".to_string(),
        Type::Float => "double".to_string(),
        Type::Bool => "i1".to_string(),
        Type::String => "i8*".to_string(),
        Type::Void => "void".to_string(),
        Type::DataFrame | Type::Vector | Type::Series | Type::Custom(_) => "i8*".to_string(),
        Type::Array(inner) => format!("{{ i64, {}* }}", lower_type(inner)),
        Type::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(lower_type).collect();
            format!("{{ {} }}", parts.join(", "))
        }
        // First-class function values never escape a call site in this language
        // (lambdas are only ever passed straight into filter/map/reduce), so a
        // generic function *value* only ever needs to flow as an opaque pointer.
        Type::Function(..) => "i8*".to_string(),
        // Reached only if emission runs on an AST phase 1/2 already rejected;
        // the emitter assumes a type-checked program (§4.E "Failure handling").
        Type::Error | Type::Var(_) => "i8*".to_string(),
    }
}

/// The element type lowering used inside an `Array τ` aggregate's `data*` field.
pub fn lower_element_type(ty: &Type) -> String {
    match ty {
        Type::Array(inner) => lower_type(inner),
        other => lower_type(other),
    }
}
