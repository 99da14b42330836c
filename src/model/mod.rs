// Classification — Naive Bayes over count vectors, wrapped with the
// vectorizer into a single trainable pipeline.

pub mod classes;
pub mod naive_bayes;
pub mod pipeline;
pub mod prediction;
pub mod traits;
