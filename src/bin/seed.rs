use clap::Parser;
use courseboard::{
    auth::AuthService,
    config::Settings,
    domain::{CreateAnnouncement, CreateCourseRequest, CreateUserRequest, ReactionType, Role, User},
    repository::{
        AnnouncementRepository, SqliteAnnouncementRepository,
        CommentRepository, SqliteCommentRepository,
        CourseRepository, SqliteCourseRepository,
        EnrollmentRepository, SqliteEnrollmentRepository,
        ReactionRepository, SqliteReactionRepository,
        UserRepository, SqliteUserRepository,
    },
};
use fake::{
    faker::name::en::{FirstName, LastName},
    Fake,
};
use sqlx::sqlite::SqlitePoolOptions;

const DEFAULT_PASSWORD: &str = "password123";

/// Populate a Courseboard database with demo courses, users and activity.
#[derive(Parser)]
#[command(name = "seed", version, about)]
struct Cli {
    /// Database to seed. Defaults to the server's configured `database.url`.
    #[arg(long)]
    database_url: Option<String>,

    /// Number of additional students with generated names.
    #[arg(long, default_value_t = 0)]
    extra_students: usize,
}

const COURSES: &[(&str, &str, &str)] = &[
    ("PRG1", "Programming 1", "Introduction to programming and problem solving"),
    ("PRG2", "Programming 2", "Object-oriented design and data structures"),
    ("BDP", "Databases", "Relational modelling, SQL and transactions"),
    ("WEB", "Web Programming", "HTTP, HTML and building web services"),
    ("ALG", "Algorithms", "Sorting, graphs and complexity analysis"),
    ("SIN", "Software Engineering", "Requirements, testing and team workflows"),
    ("RM", "Computer Networks", "Network layers, routing and protocols"),
    ("OS", "Operating Systems", "Processes, memory and file systems"),
];

const PROFESSORS: &[(&str, &str)] = &[
    ("prof1", "Ana Kovač"),
    ("prof2", "Marko Horvat"),
    ("prof3", "Ivana Novak"),
];

const STUDENTS: &[(&str, &str)] = &[
    ("student1", "Luka Babić"),
    ("student2", "Petra Jurić"),
    ("student3", "Ivan Marić"),
    ("student4", "Maja Knežević"),
    ("student5", "Tomislav Vuković"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    println!("🌱 Starting database seeding...");

    let mut database = Settings::new()?.database;
    if let Some(url) = cli.database_url {
        database.url = url;
    }

    println!("🗄️  Seeding {}", database.url);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(database.connect_options()?)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let user_repo = SqliteUserRepository::new(db_pool.clone());
    let course_repo = SqliteCourseRepository::new(db_pool.clone());
    let enrollment_repo = SqliteEnrollmentRepository::new(db_pool.clone());
    let announcement_repo = SqliteAnnouncementRepository::new(db_pool.clone());
    let reaction_repo = SqliteReactionRepository::new(db_pool.clone());
    let comment_repo = SqliteCommentRepository::new(db_pool.clone());

    if !course_repo.list_active(1, 0).await?.is_empty() {
        println!("⚠️  Database already contains courses, nothing to do.");
        return Ok(());
    }

    println!("📚 Creating courses...");
    let mut courses = Vec::with_capacity(COURSES.len());
    for (code, name, description) in COURSES {
        let course = course_repo.create(CreateCourseRequest {
            name: name.to_string(),
            code: code.to_string(),
            description: Some(description.to_string()),
        }).await?;
        courses.push(course);
    }
    println!("  ✅ Created {} courses", courses.len());

    let password_hash = AuthService::hash_password(DEFAULT_PASSWORD).await?;

    println!("👥 Creating users...");
    let mut professors = Vec::new();
    for (username, full_name) in PROFESSORS {
        professors.push(create_user(&user_repo, username, full_name, Role::Professor, &password_hash).await?);
    }

    let mut students = Vec::new();
    for (username, full_name) in STUDENTS {
        students.push(create_user(&user_repo, username, full_name, Role::Student, &password_hash).await?);
    }

    for i in 0..cli.extra_students {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let username = format!("{}.{}{}", first.to_lowercase(), last.to_lowercase(), i + 1);
        let full_name = format!("{} {}", first, last);
        students.push(create_user(&user_repo, &username, &full_name, Role::Student, &password_hash).await?);
    }
    println!(
        "  ✅ Created {} professors and {} students (password: {})",
        professors.len(),
        students.len(),
        DEFAULT_PASSWORD
    );

    println!("📝 Enrolling users...");
    // Each professor teaches up to three consecutive courses.
    for (i, professor) in professors.iter().enumerate() {
        for course in courses.iter().skip(i * 3).take(3) {
            enrollment_repo.enroll(professor.id, course.id).await?;
        }
    }

    for (i, student) in students.iter().enumerate() {
        for offset in 0..3 {
            let course = &courses[(i + offset) % courses.len()];
            enrollment_repo.enroll(student.id, course.id).await?;
        }
    }

    println!("📢 Creating announcements...");
    let mut announcement_count = 0;
    for (i, professor) in professors.iter().enumerate() {
        for course in courses.iter().skip(i * 3).take(3) {
            let announcement = announcement_repo.create(
                professor.id,
                CreateAnnouncement {
                    course_id: course.id,
                    title: format!("Welcome to {}", course.name),
                    content: format!(
                        "Lectures for {} start next week. Materials will be posted here.",
                        course.code
                    ),
                },
                None,
            ).await?;
            announcement_count += 1;

            for (j, student) in students.iter().enumerate() {
                if !enrollment_repo.is_enrolled(student.id, course.id).await? {
                    continue;
                }

                let reaction = if j % 4 == 3 { ReactionType::Dislike } else { ReactionType::Like };
                reaction_repo.upsert(student.id, announcement.id, reaction).await?;

                if j % 2 == 0 {
                    comment_repo
                        .create(announcement.id, student.id, "Looking forward to it!")
                        .await?;
                }
            }
        }
    }
    println!("  ✅ Created {} announcements with reactions and comments", announcement_count);

    println!("✨ Seeding complete!");
    println!("   Professors: prof1@example.com .. prof{}@example.com", professors.len());
    println!("   Students:   student1@example.com .. student{}@example.com", STUDENTS.len());

    Ok(())
}

async fn create_user(
    repo: &SqliteUserRepository,
    username: &str,
    full_name: &str,
    role: Role,
    password_hash: &str,
) -> anyhow::Result<User> {
    let user = repo.create(
        CreateUserRequest {
            email: format!("{}@example.com", username),
            username: username.to_string(),
            full_name: full_name.to_string(),
            password: String::new(),
            role,
        },
        password_hash.to_string(),
    ).await?;

    Ok(user)
}
