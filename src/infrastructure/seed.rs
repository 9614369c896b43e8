use sea_orm::{EntityTrait, PaginatorTrait};

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::book::{Entity as BookEntity, NewBook};
use crate::models::user::Role;

/// Populate an empty database with a few books and members.
/// Does nothing if any book is already catalogued.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    if BookEntity::find().count(state.db()).await? > 0 {
        tracing::info!("Catalog not empty, skipping demo data");
        return Ok(());
    }

    // 1. Create Users
    let users = [
        ("Alice", Role::Student),
        ("Bob", Role::Student),
        ("Margaret", Role::Librarian),
    ];
    for (name, role) in users {
        state.user_repo.create(name.to_owned(), role).await?;
    }

    // 2. Create Books with copies
    let books = [
        ("Dune", "Frank Herbert", "978-0441172719", 2),
        ("Foundation", "Isaac Asimov", "978-0553293357", 1),
        ("The Hobbit", "J.R.R. Tolkien", "978-0547928227", 3),
    ];
    for (title, author, isbn, num_of_copies) in books {
        state
            .book_repo
            .create(NewBook {
                title: title.to_owned(),
                author: author.to_owned(),
                isbn: isbn.to_owned(),
                num_of_copies,
            })
            .await?;
    }

    Ok(())
}
