mod common;

use courseboard::{
    domain::{Course, CreateAnnouncement, ReactionType, Role, UpdateAnnouncement, User},
    error::AppError,
    repository::ReactionRepository,
    service::{Page, ServiceContext},
    uploads::UploadedFile,
};

use common::{create_course, create_user, test_context};

struct Classroom {
    professor: User,
    student: User,
    other_student: User,
    course: Course,
}

async fn classroom(ctx: &ServiceContext) -> anyhow::Result<Classroom> {
    let professor = create_user(ctx, "prof", Role::Professor).await?;
    let student = create_user(ctx, "ana", Role::Student).await?;
    let other_student = create_user(ctx, "ivan", Role::Student).await?;
    let course = create_course(ctx, "PRG1").await?;

    for user in [&professor, &student, &other_student] {
        ctx.course_service.enroll(user, course.id).await?;
    }

    Ok(Classroom { professor, student, other_student, course })
}

fn announcement(course: &Course, title: &str) -> CreateAnnouncement {
    CreateAnnouncement {
        course_id: course.id,
        title: title.to_string(),
        content: "Exam moved to Friday".to_string(),
    }
}

#[tokio::test]
async fn test_reaction_toggles_in_place() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;

    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Exam"), None)
        .await?;
    let id = post.announcement.id;

    let first = ctx.reaction_service.react(&room.student, id, "like").await?;
    let view = ctx.announcement_service.get(&room.student, id).await?;
    assert_eq!(view.like_count, 1);
    assert_eq!(view.dislike_count, 0);
    assert_eq!(view.user_reaction, Some(ReactionType::Like));

    // Switching keeps the same row
    let second = ctx.reaction_service.react(&room.student, id, "dislike").await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.reaction_type, ReactionType::Dislike);

    let view = ctx.announcement_service.get(&room.student, id).await?;
    assert_eq!(view.like_count, 0);
    assert_eq!(view.dislike_count, 1);
    assert_eq!(view.user_reaction, Some(ReactionType::Dislike));

    // Another viewer sees the totals but no reaction of their own
    let view = ctx.announcement_service.get(&room.other_student, id).await?;
    assert_eq!(view.dislike_count, 1);
    assert_eq!(view.user_reaction, None);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reactions WHERE announcement_id = ?")
        .bind(id.to_string())
        .fetch_one(&ctx.db_pool)
        .await?;
    assert_eq!(rows, 1);

    ctx.reaction_service.remove(&room.student, id).await?;
    assert!(ctx.reaction_repo.find(room.student.id, id).await?.is_none());

    let err = ctx.reaction_service.remove(&room.student, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_reaction_guards() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;
    let outsider = create_user(&ctx, "marko", Role::Student).await?;

    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Exam"), None)
        .await?;
    let id = post.announcement.id;

    let err = ctx.reaction_service.react(&room.student, id, "love").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx.reaction_service.react(&room.student, id, "Like").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx.reaction_service.react(&room.professor, id, "like").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = ctx.reaction_service.react(&outsider, id, "like").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg.contains("Not enrolled")));

    let err = ctx.reaction_service
        .react(&room.student, uuid::Uuid::new_v4(), "like")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_announcement_role_and_enrollment_guards() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;
    let other_course = create_course(&ctx, "OS").await?;

    // Students cannot post
    let err = ctx.announcement_service
        .create(&room.student, announcement(&room.course, "Hi"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg.contains("professors")));

    // Professors only post where they are enrolled
    let err = ctx.announcement_service
        .create(&room.professor, announcement(&other_course, "Hi"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg.contains("Not enrolled")));

    let err = ctx.announcement_service
        .list_for_course(&room.professor, other_course.id, Page::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "   "), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_only_author_may_modify_announcement() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;
    let colleague = create_user(&ctx, "prof2", Role::Professor).await?;
    ctx.course_service.enroll(&colleague, room.course.id).await?;

    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Exam"), None)
        .await?;
    let id = post.announcement.id;

    let update = UpdateAnnouncement {
        title: Some("Changed".to_string()),
        content: None,
    };

    let err = ctx.announcement_service
        .update(&colleague, id, update.clone(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg.contains("your own")));

    let err = ctx.announcement_service.delete(&colleague, id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let updated = ctx.announcement_service
        .update(&room.professor, id, update, None)
        .await?;
    assert_eq!(updated.announcement.title, "Changed");
    assert_eq!(updated.announcement.content, "Exam moved to Friday");

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_reactions_and_comments() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;

    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Exam"), None)
        .await?;
    let id = post.announcement.id;

    ctx.reaction_service.react(&room.student, id, "like").await?;
    ctx.reaction_service.react(&room.other_student, id, "dislike").await?;
    ctx.comment_service.create(&room.student, id, "Thanks!").await?;
    ctx.comment_service.create(&room.other_student, id, "Which room?").await?;

    let view = ctx.announcement_service.get(&room.professor, id).await?;
    assert_eq!(view.comment_count, 2);
    assert_eq!(view.like_count + view.dislike_count, 2);

    ctx.announcement_service.delete(&room.professor, id).await?;

    let err = ctx.announcement_service.get(&room.professor, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    for table in ["reactions", "comments"] {
        let orphans: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE announcement_id = ?",
            table
        ))
        .bind(id.to_string())
        .fetch_one(&ctx.db_pool)
        .await?;
        assert_eq!(orphans, 0, "{} left behind", table);
    }

    Ok(())
}

#[tokio::test]
async fn test_comment_ownership() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;

    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Exam"), None)
        .await?;
    let id = post.announcement.id;

    let err = ctx.comment_service.create(&room.professor, id, "Noted").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let comment = ctx.comment_service.create(&room.student, id, "Thanks!").await?;
    assert_eq!(comment.author.username, "ana");

    let err = ctx.comment_service
        .update(&room.other_student, comment.comment.id, "Hijacked")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(ref msg) if msg.contains("your own")));

    let err = ctx.comment_service
        .delete(&room.other_student, comment.comment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let edited = ctx.comment_service
        .update(&room.student, comment.comment.id, "  Thanks a lot!  ")
        .await?;
    assert_eq!(edited.comment.content, "Thanks a lot!");

    let comments = ctx.comment_service.list(&room.other_student, id, Page::default()).await?;
    assert_eq!(comments.len(), 1);

    ctx.comment_service.delete(&room.student, comment.comment.id).await?;
    let comments = ctx.comment_service.list(&room.student, id, Page::default()).await?;
    assert!(comments.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_is_newest_first_and_paged() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;

    for title in ["First", "Second", "Third"] {
        ctx.announcement_service
            .create(&room.professor, announcement(&room.course, title), None)
            .await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all = ctx.announcement_service
        .list_for_course(&room.student, room.course.id, Page::default())
        .await?;
    let titles: Vec<_> = all.iter().map(|v| v.announcement.title.as_str()).collect();
    assert_eq!(titles, ["Third", "Second", "First"]);
    assert_eq!(all[0].author.username, "prof");

    let page = ctx.announcement_service
        .list_for_course(&room.student, room.course.id, Page::new(Some(1), Some(1)))
        .await?;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].announcement.title, "Second");

    Ok(())
}

#[tokio::test]
async fn test_announcement_image_is_stored_and_replaced() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let room = classroom(&ctx).await?;

    let image = UploadedFile {
        file_name: "board.png".to_string(),
        data: vec![0x89, b'P', b'N', b'G'],
    };
    let post = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Board"), Some(image.clone()))
        .await?;

    let first_path = post.announcement.image_path.clone().expect("image stored");
    assert!(first_path.starts_with("images/"));
    assert!(ctx.file_store.resolve(&first_path).map(|p| p.exists()).unwrap_or(false));

    let updated = ctx.announcement_service
        .update(&room.professor, post.announcement.id, UpdateAnnouncement::default(), Some(image))
        .await?;
    let second_path = updated.announcement.image_path.clone().expect("image stored");
    assert_ne!(first_path, second_path);
    assert!(!ctx.file_store.resolve(&first_path).map(|p| p.exists()).unwrap_or(true));

    let bad = UploadedFile {
        file_name: "notes.pdf".to_string(),
        data: b"%PDF".to_vec(),
    };
    let err = ctx.announcement_service
        .create(&room.professor, announcement(&room.course, "Bad"), Some(bad))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}
