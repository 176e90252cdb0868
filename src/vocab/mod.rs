// Vocabulary: subjects, their labels, and the graph relations between them.

pub mod relations;
pub mod vocabulary;

pub use relations::{RelationMatrices, RelationMatrix};
pub use vocabulary::{SubjectId, Term, Vocabulary};
