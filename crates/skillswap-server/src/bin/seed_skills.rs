use std::path::PathBuf;

use tracing::info;
use uuid::Uuid;

const PREDEFINED_SKILLS: &[&str] = &[
    "Python Programming",
    "JavaScript",
    "React Development",
    "Django Development",
    "Web Design",
    "Graphic Design",
    "Digital Marketing",
    "Content Writing",
    "Photography",
    "Video Editing",
    "Cooking",
    "Language Teaching",
    "Fitness Training",
    "Music Production",
    "Data Analysis",
    "Project Management",
    "UI/UX Design",
    "Mobile App Development",
    "SEO Optimization",
    "Social Media Management",
];

/// Idempotently seed the skill catalog.
fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillswap=info".into()),
        )
        .init();

    let db_path = std::env::var("SKILLSWAP_DB_PATH").unwrap_or_else(|_| "skillswap.db".into());
    let db = skillswap_db::Database::open(&PathBuf::from(&db_path))?;

    let mut created = 0;
    for name in PREDEFINED_SKILLS {
        if db.ensure_skill(&Uuid::new_v4().to_string(), name)? {
            created += 1;
            info!("Created skill: {name}");
        } else {
            info!("Skill already exists: {name}");
        }
    }

    info!(
        "Processed {} skills, {created} newly created",
        PREDEFINED_SKILLS.len()
    );
    Ok(())
}
