//! The encoder contract: the sole extension point for lowering a validated
//! filter into a backend-specific query representation.

use crate::ast::{Condition, Expression, Filter};

/// A backend lowering of filter nodes into query fragments.
///
/// One method per node shape; `encode` drives the traversal and composes
/// child fragments bottom-up, in order. Implementations only ever see
/// validated [`Condition`]s, so unvalidated input can never reach a backend
/// query.
pub trait Encoder {
	/// An opaque backend-specific query unit for one filter node.
	type Fragment;

	fn encode_condition(&self, condition: &Condition) -> Self::Fragment;
	fn encode_and(&self, children: Vec<Self::Fragment>) -> Self::Fragment;
	fn encode_or(&self, children: Vec<Self::Fragment>) -> Self::Fragment;
	fn encode_not(&self, child: Self::Fragment) -> Self::Fragment;
}

/// Lowers a validated filter through the encoder, one call per node,
/// children before parents and left to right. Pure: encoding the same filter
/// twice yields structurally identical fragments.
pub fn encode<E: Encoder>(filter: &Filter, encoder: &E) -> E::Fragment {
	match filter {
		Expression::Condition(condition) => encoder.encode_condition(condition),
		Expression::Not(child) => {
			let inner = encode(child, encoder);
			encoder.encode_not(inner)
		}
		Expression::And(children) => {
			let fragments = children.iter().map(|child| encode(child, encoder)).collect();
			encoder.encode_and(fragments)
		}
		Expression::Or(children) => {
			let fragments = children.iter().map(|child| encode(child, encoder)).collect();
			encoder.encode_or(fragments)
		}
	}
}
