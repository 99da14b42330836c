// Text vectorization — turns raw expense descriptions into sparse count
// vectors over a vocabulary frozen at training time.

pub mod tokenize;
pub mod vectorizer;
pub mod vocabulary;
