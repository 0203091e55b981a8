pub mod phrase;
pub mod subject_verb;
