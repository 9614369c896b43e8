use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    tracing::debug!("Database ready at {}", database_url);

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        sql.to_owned(),
    ))
    .await?;
    Ok(())
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create books table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            isbn TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create copies table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS copies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'available'
                CHECK (status IN ('available', 'checked_out')),
            FOREIGN KEY (book_id) REFERENCES books(id)
        )
        "#,
    )
    .await?;

    // Availability lookup: first available copy of a book
    execute(
        db,
        "CREATE INDEX IF NOT EXISTS idx_copies_book_status ON copies(book_id, status)",
    )
    .await?;

    // Create users table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('student', 'librarian')),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    // Create checkouts table
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS checkouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            book_copy_id INTEGER NOT NULL,
            due_date TEXT NOT NULL,
            returned INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOREIGN KEY (book_copy_id) REFERENCES copies(id)
        )
        "#,
    )
    .await?;

    // A copy has at most one open checkout
    execute(
        db,
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_checkouts_open_copy
            ON checkouts(book_copy_id) WHERE returned = 0
        "#,
    )
    .await?;

    // Create reservations table (no foreign keys: reserving is permissive)
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .await?;

    // Queue head lookup: earliest active reservation of a book
    execute(
        db,
        r#"
        CREATE INDEX IF NOT EXISTS idx_reservations_queue
            ON reservations(book_id, active, created_at)
        "#,
    )
    .await?;

    Ok(())
}
