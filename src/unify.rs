//! Hindley-Milner-style unification (§4.D "Unifier"): fresh type variables, an
//! occurs check, and substitution composition. The analyzer calls this only
//! where an expression actually needs a fresh variable resolved (empty array
//! literals, unannotated lambda parameters); most statement/expression rules
//! use `Type::compatible` directly instead.
use crate::types::{Type, VarId};

/// An ordered list of `var -> Type` bindings kept in normal form: no binding's
/// right-hand side mentions a variable that is itself bound earlier in the list.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: Vec<(VarId, Type)>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    fn single(var: VarId, ty: Type) -> Self {
        Self {
            bindings: vec![(var, ty)],
        }
    }

    fn lookup(&self, var: VarId) -> Option<&Type> {
        self.bindings.iter().find(|(v, _)| *v == var).map(|(_, t)| t)
    }

    /// Replace every bound variable inside `ty` with its mapping, recursively.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(id) => match self.lookup(*id) {
                Some(bound) => self.apply(bound),
                None => ty.clone(),
            },
            Type::Array(inner) => Type::Array(Box::new(self.apply(inner))),
            Type::Tuple(items) => Type::Tuple(items.iter().map(|t| self.apply(t)).collect()),
            Type::Function(params, ret) => Type::Function(
                params.iter().map(|t| self.apply(t)).collect(),
                Box::new(self.apply(ret)),
            ),
            other => other.clone(),
        }
    }

    /// Compose `self` followed by `other`: apply `other` to `self`'s targets,
    /// then append any binding from `other` whose domain is fresh.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut bindings: Vec<(VarId, Type)> = self
            .bindings
            .iter()
            .map(|(v, t)| (*v, other.apply(t)))
            .collect();
        for (v, t) in &other.bindings {
            if !bindings.iter().any(|(existing, _)| existing == v) {
                bindings.push((*v, t.clone()));
            }
        }
        Substitution { bindings }
    }
}

/// Returns the substitution that makes `a` and `b` structurally identical, or an
/// error message naming the mismatch (§4.D "Unifier").
pub fn unify(a: &Type, b: &Type) -> Result<Substitution, String> {
    if a.equal(b) {
        return Ok(Substitution::empty());
    }
    match (a, b) {
        (Type::Var(v), _) => bind(*v, b),
        (_, Type::Var(v)) => bind(*v, a),
        (Type::Array(e1), Type::Array(e2)) => unify(e1, e2),
        (Type::Tuple(ts), Type::Tuple(us)) => {
            if ts.len() != us.len() {
                return Err(format!(
                    "cannot unify tuples of different arity: {} vs {}",
                    ts.len(),
                    us.len()
                ));
            }
            let mut sub = Substitution::empty();
            for (t, u) in ts.iter().zip(us.iter()) {
                let step = unify(&sub.apply(t), &sub.apply(u))?;
                sub = sub.compose(&step);
            }
            Ok(sub)
        }
        (Type::Function(ps, r), Type::Function(qs, s)) => {
            if ps.len() != qs.len() {
                return Err(format!(
                    "cannot unify functions of different arity: {} vs {}",
                    ps.len(),
                    qs.len()
                ));
            }
            let mut sub = Substitution::empty();
            for (p, q) in ps.iter().zip(qs.iter()) {
                let step = unify(&sub.apply(p), &sub.apply(q))?;
                sub = sub.compose(&step);
            }
            let step = unify(&sub.apply(r), &sub.apply(s))?;
            sub = sub.compose(&step);
            Ok(sub)
        }
        _ => Err(format!("cannot unify {} with {}", a, b)),
    }
}

fn bind(v: VarId, ty: &Type) -> Result<Substitution, String> {
    if let Type::Var(other) = ty {
        if *other == v {
            return Ok(Substitution::empty());
        }
    }
    if ty.contains_var(v) {
        return Err(format!("infinite type: 'T{} occurs in {}", v, ty));
    }
    Ok(Substitution::single(v, ty.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_equal_types_is_empty_substitution() {
        let sub = unify(&Type::Int, &Type::Int).unwrap();
        assert_eq!(sub.apply(&Type::Int), Type::Int);
    }

    #[test]
    fn unify_var_with_concrete_type_binds_it() {
        let sub = unify(&Type::Var(0), &Type::Bool).unwrap();
        assert_eq!(sub.apply(&Type::Var(0)), Type::Bool);
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let result = unify(&Type::Var(1), &Type::Array(Box::new(Type::Var(1))));
        assert!(result.is_err());
    }

    #[test]
    fn unify_arrays_recurses_into_element_type() {
        let sub = unify(
            &Type::Array(Box::new(Type::Var(2))),
            &Type::Array(Box::new(Type::Int)),
        )
        .unwrap();
        assert_eq!(sub.apply(&Type::Var(2)), Type::Int);
    }

    #[test]
    fn unify_functions_composes_through_params_and_return() {
        let a = Type::Function(vec![Type::Var(0)], Box::new(Type::Var(1)));
        let b = Type::Function(vec![Type::Int], Box::new(Type::Bool));
        let sub = unify(&a, &b).unwrap();
        assert_eq!(sub.apply(&Type::Var(0)), Type::Int);
        assert_eq!(sub.apply(&Type::Var(1)), Type::Bool);
    }

    #[test]
    fn unify_mismatched_structural_types_fails() {
        assert!(unify(&Type::Int, &Type::Bool).is_err());
    }
}
