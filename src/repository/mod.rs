//! Repository layer: in-memory storage, reset on restart

pub mod books;

/// Records present at process start
pub const SEED_BOOKS: [(&str, &str); 3] = [
    ("Eloquent JavaScript", "Marijn Haverbeke"),
    ("You Don't Know JS", "Kyle Simpson"),
    ("JavaScript: The Good Parts", "Douglas Crockford"),
];

/// Main repository struct holding every store
#[derive(Clone, Default)]
pub struct Repository {
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a repository around the given book store
    pub fn new(books: books::BooksRepository) -> Self {
        Self { books }
    }

    /// Repository pre-filled with the seed records
    pub fn seeded() -> Self {
        Self::new(books::BooksRepository::with_books(SEED_BOOKS))
    }
}
