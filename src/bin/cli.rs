use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use trivia_api::configuration::DatabaseSettings;
use trivia_api::db::queries::categories::{get_all_categories, import_categories};
use trivia_api::db::queries::questions::{get_all_questions, import_questions};
use trivia_api::db::{establish_connection, run_migrations, Category, Question};
use trivia_api::query::QueryService;
use trivia_api::quiz::{Draw, QuizSession};
use trivia_api::store::{NewQuestion, QuestionStore, SqliteStore};
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database path
    db_path: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories.csv and questions.csv into a directory
    Export { path: PathBuf },
    /// Play a quiz in the terminal
    Play {
        /// Only ask questions from this category id
        #[clap(long)]
        category: Option<i64>,
        /// Seed for a reproducible question order
        #[clap(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = DatabaseSettings {
        path: cli.db_path.display().to_string(),
        create_if_missing: true,
    };
    let pool = establish_connection(&settings)
        .await
        .context("Cannot connect to DB")?;
    run_migrations(&pool).await?;
    match cli.command {
        Commands::Export { path } => export_data(&pool, path).await.context("Cannot export"),
        Commands::Import { path } => import_data(&pool, path).await.context("Cannot import"),
        Commands::Play { category, seed } => play(pool, category, seed).await,
    }
}

fn write_to(path: PathBuf, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: PathBuf) -> anyhow::Result<Vec<T>> {
    let file =
        std::fs::File::open(&path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

async fn export_data(pool: &SqlitePool, path: PathBuf) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(&path)?
    }
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        path.display()
    );
    write_to(path.join("categories.csv"), categories)?;
    write_to(path.join("questions.csv"), questions)?;
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: PathBuf) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(path.join("categories.csv"))?;
    let questions: Vec<Question> = read_from(path.join("questions.csv"))?;
    for question in &questions {
        NewQuestion::new(
            question.question.as_str(),
            question.answer.as_str(),
            question.category,
            question.difficulty,
        )
        .validate()
        .with_context(|| format!("Question {} is invalid", question.id))?;
    }

    let known: HashSet<i64> = get_all_categories(pool)
        .await?
        .iter()
        .chain(&categories)
        .map(|c| c.id)
        .collect();
    if let Some(question) = questions.iter().find(|q| !known.contains(&q.category)) {
        bail!(
            "Question {} refers to unknown category {}",
            question.id,
            question.category
        );
    }

    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        path.display()
    );
    let mut tx = pool.begin().await?;
    import_categories(&mut tx, categories).await?;
    import_questions(&mut tx, questions).await?;
    tx.commit().await?;
    Ok(())
}

fn prompt(text: &str) -> anyhow::Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_lowercase())
}

async fn play(pool: SqlitePool, category: Option<i64>, seed: Option<u64>) -> anyhow::Result<()> {
    let query = QueryService::new(SqliteStore::new(pool));
    match category {
        Some(id) => {
            let category = query
                .store()
                .category(id)
                .await
                .with_context(|| format!("Unknown category {id}"))?;
            println!("Playing {}", category.name);
        }
        None => println!("Playing all categories"),
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = QuizSession::start(&query, category).await?;
    let (mut asked, mut correct) = (0, 0);

    while let Draw::Question(question) = session.next(&query, &mut rng).await? {
        asked += 1;
        println!();
        println!(
            "[{asked}] {} (difficulty {})",
            question.question, question.difficulty
        );
        if prompt("Press Enter to reveal the answer, q to quit: ")? == "q" {
            break;
        }
        println!("Answer: {}", question.answer);
        match prompt("Did you get it right? [y/N/q] ")?.as_str() {
            "y" | "yes" => correct += 1,
            "q" => break,
            _ => {}
        }
    }

    println!();
    println!("Score: {correct}/{asked}");
    Ok(())
}
