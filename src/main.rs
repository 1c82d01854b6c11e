use std::path::{Path, PathBuf};

use academic_records::aggregate::{filter_results, sort_results, SortKey};
use academic_records::config::Config;
use academic_records::dataset::{CourseCsv, Dataset, GradeCsv, StudentCsv};
use academic_records::models::Term;
use academic_records::{db, report, search, stats};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "academic-records")]
#[command(about = "Student records and GPA preprocessing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct Source {
    /// Read students.csv, courses.csv and grades.csv from this directory instead of Postgres
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample students, courses and grades
    Seed,
    /// Import a directory of students.csv, courses.csv and grades.csv
    Import {
        #[arg(long)]
        dir: PathBuf,
    },
    /// List students
    Students {
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        source: Source,
    },
    /// List courses
    Courses {
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        source: Source,
    },
    /// List grades with their student and course
    Grades {
        #[arg(long)]
        search: Option<String>,
        #[command(flatten)]
        source: Source,
    },
    /// Add or update a student by code
    AddStudent {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        major: String,
        #[arg(long)]
        cohort_year: i32,
    },
    /// Add or update a course by code
    AddCourse {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        credit_hours: i32,
        #[arg(long, default_value_t = 1)]
        term_order: i32,
        #[arg(long, default_value = "")]
        instructor: String,
    },
    /// Record a grade for a student in a course
    AddGrade {
        #[arg(long)]
        student: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        score: f64,
        #[arg(long)]
        letter: String,
        /// Ganjil or Genap
        #[arg(long)]
        term: Term,
        #[arg(long)]
        academic_year: String,
    },
    /// Delete a student and every grade they hold
    DeleteStudent {
        #[arg(long)]
        code: String,
    },
    /// Compute GPA, credits, mean score and category per student
    Preprocess {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = SortKey::Input)]
        sort: SortKey,
        #[arg(long)]
        limit: Option<usize>,
        /// Print full-precision results as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        source: Source,
    },
    /// Show dashboard totals and distributions
    Stats {
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        source: Source,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        source: Source,
    },
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    debug!(max_connections = config.max_connections, "connected to Postgres");
    Ok(pool)
}

async fn load(config: &Config, source: &Source) -> anyhow::Result<Dataset> {
    match source.csv_dir.as_deref() {
        Some(dir) => Dataset::from_csv_dir(dir),
        None => db::fetch_dataset(&connect(config).await?).await,
    }
}

fn write_report(out: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect(&config).await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect(&config).await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { dir } => {
            let summary = db::import_dir(&connect(&config).await?, &dir).await?;
            println!(
                "Imported {} students, {} courses and {} grades from {} ({} grades skipped).",
                summary.students,
                summary.courses,
                summary.grades,
                dir.display(),
                summary.skipped_grades
            );
        }
        Commands::Students { search, source } => {
            let dataset = load(&config, &source).await?;
            let students = search::filter_students(&dataset.students, search.as_deref().unwrap_or(""));
            for student in students.iter() {
                println!(
                    "- {} {} ({}, {})",
                    student.code, student.name, student.major, student.cohort_year
                );
            }
            println!("Showing {} of {} students.", students.len(), dataset.students.len());
        }
        Commands::Courses { search, source } => {
            let dataset = load(&config, &source).await?;
            let courses = search::filter_courses(&dataset.courses, search.as_deref().unwrap_or(""));
            for course in courses.iter() {
                println!(
                    "- {} {} ({} credits, term {}) taught by {}",
                    course.code, course.name, course.credit_hours, course.term_order, course.instructor
                );
            }
            println!("Showing {} of {} courses.", courses.len(), dataset.courses.len());
        }
        Commands::Grades { search, source } => {
            let dataset = load(&config, &source).await?;
            let rows = search::enrich_grades(&dataset.students, &dataset.courses, &dataset.grades);
            let matched = search::filter_grade_rows(&rows, search.as_deref().unwrap_or(""));
            for row in matched.iter() {
                println!(
                    "- {} {} / {} {}: {:.2} {} ({} {})",
                    row.student_code,
                    row.student_name,
                    row.course_code,
                    row.course_name,
                    row.score,
                    row.letter,
                    row.term,
                    row.academic_year
                );
            }
            println!("Showing {} of {} grades.", matched.len(), rows.len());
        }
        Commands::AddStudent {
            code,
            name,
            email,
            major,
            cohort_year,
        } => {
            let row = StudentCsv {
                code,
                name,
                email,
                major,
                cohort_year,
            };
            let id = db::upsert_student(&connect(&config).await?, &row).await?;
            info!(%id, code = %row.code, "student saved");
            println!("Saved student {}.", row.code);
        }
        Commands::AddCourse {
            code,
            name,
            credit_hours,
            term_order,
            instructor,
        } => {
            let row = CourseCsv {
                code,
                name,
                credit_hours,
                term_order,
                instructor,
            };
            let id = db::upsert_course(&connect(&config).await?, &row).await?;
            info!(%id, code = %row.code, "course saved");
            println!("Saved course {}.", row.code);
        }
        Commands::AddGrade {
            student,
            course,
            score,
            letter,
            term,
            academic_year,
        } => {
            let row = GradeCsv {
                student_code: student,
                course_code: course,
                score,
                letter,
                term,
                academic_year,
            };
            match db::upsert_grade(&connect(&config).await?, &row).await? {
                Some(id) => {
                    info!(%id, "grade saved");
                    println!("Saved grade for {} in {}.", row.student_code, row.course_code);
                }
                None => anyhow::bail!(
                    "student {} or course {} does not exist",
                    row.student_code,
                    row.course_code
                ),
            }
        }
        Commands::DeleteStudent { code } => {
            if db::delete_student(&connect(&config).await?, &code).await? {
                println!("Deleted student {code} and their grades.");
            } else {
                println!("No student with code {code}.");
            }
        }
        Commands::Preprocess {
            search,
            sort,
            limit,
            json,
            source,
        } => {
            let dataset = load(&config, &source).await?;
            let all = dataset.aggregate();
            let mut results = filter_results(&all, search.as_deref().unwrap_or(""));
            sort_results(&mut results, sort);
            let shown = limit.unwrap_or(results.len()).min(results.len());

            if json {
                println!("{}", serde_json::to_string_pretty(&results[..shown])?);
                return Ok(());
            }

            if all.is_empty() {
                println!("No students recorded.");
                return Ok(());
            }

            for result in results.iter().take(shown) {
                println!(
                    "- {} {} ({}) GPA {:.2}, {} credits, mean score {:.2}, {}",
                    result.code,
                    result.name,
                    result.major,
                    result.gpa,
                    result.total_credits,
                    result.mean_score,
                    result.category
                );
            }
            println!("Showing {} of {} preprocessed students.", shown, all.len());
        }
        Commands::Stats { json, source } => {
            let dataset = load(&config, &source).await?;
            let results = dataset.aggregate();
            let summary =
                stats::dashboard_stats(&dataset.students, &dataset.courses, &dataset.grades, &results);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Students: {}", summary.total_students);
            println!("Courses: {}", summary.total_courses);
            println!("Grades: {}", summary.total_grades);
            println!("Mean GPA: {:.2}", summary.mean_gpa);
            println!("Letter grades:");
            for entry in summary.letter_distribution.iter() {
                println!("- {}: {}", entry.letter, entry.count);
            }
            println!("Majors:");
            for entry in summary.major_distribution.iter() {
                println!("- {}: {}", entry.major, entry.count);
            }
            println!("Categories:");
            for entry in summary.category_distribution.iter() {
                println!("- {}: {}", entry.category, entry.count);
            }
        }
        Commands::Report {
            search,
            out,
            source,
        } => {
            let dataset = load(&config, &source).await?;
            let all = dataset.aggregate();
            let results = filter_results(&all, search.as_deref().unwrap_or(""));
            let summary =
                stats::dashboard_stats(&dataset.students, &dataset.courses, &dataset.grades, &results);
            let contents = report::build_report(search.as_deref(), &results, &summary);
            write_report(&out, &contents)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
