//! Demo records for a fresh database, enabled with `SEED_DEMO_DATA=true`.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    common::Priority,
    flashcard::{CardType, CreateFlashcard, Flashcard},
    idea::{CreateIdea, Idea, IdeaError, IdeaStatus, UpdateIdea},
    inbox_item::{CreateInboxItem, InboxItem, InboxItemType, InboxStatus, UpdateInboxItem},
    life_area::{
        AreaReview, CreateAreaReview, CreateGoal, CreateHabit, CreateLifeArea, Goal, Habit, LifeArea,
        LifeAreaError, ReviewPeriod,
    },
    note::{CreateConnection, CreateNote, Note, NoteConnection, NoteError, NoteType},
    project::{CreateProject, Project},
    task::{CreateTask, Energy, SubtaskInput, Task, TaskError, TaskType, UpdateTask},
};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Idea(#[from] IdeaError),
    #[error(transparent)]
    LifeArea(#[from] LifeAreaError),
}

fn labels(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}

/// Insert sample data unless the inbox already has records. Returns whether it ran.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<bool, SeedError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inbox_items")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    seed_inbox(pool).await?;
    seed_tasks(pool).await?;
    seed_ideas(pool).await?;
    seed_notes(pool).await?;
    seed_flashcards(pool).await?;
    seed_life_areas(pool).await?;

    info!("Seeded demo data");
    Ok(true)
}

async fn seed_inbox(pool: &SqlitePool) -> Result<(), SeedError> {
    let items = [
        ("Research Zettelkasten method", "Look into the Zettelkasten note-taking system for knowledge management", InboxItemType::Information, Priority::Medium, &["research", "knowledge-management"][..], "web"),
        ("Buy groceries", "Milk, eggs, bread, fruits, vegetables", InboxItemType::Task, Priority::High, &["shopping", "errands"][..], "voice"),
        ("Schedule dentist appointment", "Call Dr. Smith's office to schedule regular checkup", InboxItemType::Task, Priority::Medium, &["health", "appointment"][..], "manual"),
        ("Project idea: AI task manager", "Create an AI-powered task management app that learns user patterns", InboxItemType::Idea, Priority::Low, &["project", "ai", "productivity"][..], "thought"),
        ("Book recommendation: Atomic Habits", "Friend recommended this book for habit formation and productivity", InboxItemType::Information, Priority::Low, &["reading", "recommendation", "productivity"][..], "conversation"),
    ];

    let mut created = Vec::new();
    for (title, description, item_type, priority, tags, source) in items {
        let data = CreateInboxItem {
            description: Some(description.to_string()),
            item_type: Some(item_type),
            priority: Some(priority),
            tags: labels(tags),
            source: Some(source.to_string()),
            ..CreateInboxItem::titled(title)
        };
        created.push(InboxItem::create(pool, data, Uuid::new_v4()).await?);
    }

    for (index, status) in [(2, InboxStatus::Processing), (4, InboxStatus::Completed)] {
        let changes = UpdateInboxItem {
            status: Some(status),
            ..Default::default()
        };
        InboxItem::update(pool, created[index].id, changes).await?;
    }
    Ok(())
}

async fn seed_tasks(pool: &SqlitePool) -> Result<(), SeedError> {
    let mut projects = Vec::new();
    for (name, description, priority) in [
        ("Client Work", "Deliverables for current clients", Priority::High),
        ("Health & Fitness", "Routines that keep energy up", Priority::Medium),
        ("Personal", "Family and household", Priority::Medium),
        ("Learning & Development", "Courses and side projects", Priority::High),
    ] {
        let data = CreateProject {
            description: Some(description.to_string()),
            priority: Some(priority),
            ..CreateProject::named(name)
        };
        projects.push(Project::create(pool, data, Uuid::new_v4()).await?);
    }

    let proposal = CreateTask {
        description: Some("Write and submit the Q1 project proposal for the new client".into()),
        priority: Some(Priority::High),
        energy: Some(Energy::High),
        context: labels(&["@computer", "@office"]),
        estimated_time: Some(120),
        tags: labels(&["work", "writing", "deadline"]),
        subtasks: Some(vec![
            SubtaskInput {
                completed: true,
                ..SubtaskInput::titled("Research client requirements")
            },
            SubtaskInput::titled("Draft proposal outline"),
            SubtaskInput::titled("Write full proposal"),
        ]),
        ..CreateTask::in_project("Complete project proposal", projects[0].id)
    };
    let workout = CreateTask {
        description: Some("30 minutes of cardio and strength training".into()),
        task_type: Some(TaskType::Habit),
        context: labels(&["@home", "@gym"]),
        tags: labels(&["health", "fitness", "routine"]),
        ..CreateTask::in_project("Morning workout", projects[1].id)
    };
    let call = CreateTask {
        description: Some("Weekly check-in call with mom".into()),
        energy: Some(Energy::Low),
        context: labels(&["@phone", "@home"]),
        tags: labels(&["family", "communication"]),
        ..CreateTask::in_project("Call mom", projects[2].id)
    };
    let course = CreateTask {
        description: Some("Complete React Native course and build a sample app".into()),
        task_type: Some(TaskType::Project),
        priority: Some(Priority::High),
        energy: Some(Energy::High),
        context: labels(&["@computer"]),
        estimated_time: Some(2400),
        tags: labels(&["learning", "development", "mobile"]),
        ..CreateTask::in_project("Learn React Native", projects[3].id)
    };
    let groceries = CreateTask {
        description: Some("Buy weekly groceries".into()),
        energy: Some(Energy::Low),
        context: labels(&["@errands"]),
        estimated_time: Some(45),
        tags: labels(&["shopping", "errands"]),
        ..CreateTask::in_project("Grocery shopping", projects[2].id)
    };

    for data in [proposal, workout, call, course] {
        Task::create(pool, data, Uuid::new_v4()).await?;
    }
    let done = Task::create(pool, groceries, Uuid::new_v4()).await?;
    Task::update(pool, done.id, UpdateTask::completed()).await?;
    Ok(())
}

async fn seed_ideas(pool: &SqlitePool) -> Result<(), SeedError> {
    let ideas = [
        ("AI-powered task management app", "An intelligent task manager that learns from user behavior and automatically prioritizes tasks based on energy levels and context.", IdeaStatus::Sprout, Priority::High, "technical", 9, 8, &["AI", "productivity", "mobile"][..], "$50K - $100K", "Create MVP prototype"),
        ("Community garden network", "A platform connecting people with unused garden space to those who want to grow food but lack space.", IdeaStatus::Seed, Priority::Medium, "social", 7, 6, &["community", "sustainability", "food"][..], "Social impact", "Research local regulations"),
        ("Digital decluttering service", "Help people organize their digital lives using AI and smart categorization.", IdeaStatus::Sapling, Priority::Medium, "business", 6, 5, &["organization", "AI", "service"][..], "$20K - $40K", "Build service framework"),
    ];

    for (title, description, status, priority, category, impact, effort, tags, value, milestone) in ideas {
        let data = CreateIdea {
            description: Some(description.to_string()),
            priority: Some(priority),
            category: Some(category.to_string()),
            tags: labels(tags),
            estimated_value: Some(value.to_string()),
            next_milestone: Some(milestone.to_string()),
            ..CreateIdea::scored(title, impact, effort)
        };
        let idea = Idea::create(pool, data, Uuid::new_v4()).await?;
        if status != IdeaStatus::Seed {
            let changes = UpdateIdea {
                status: Some(status),
                ..Default::default()
            };
            Idea::update(pool, idea.id, changes).await?;
        }
    }
    Ok(())
}

async fn seed_notes(pool: &SqlitePool) -> Result<(), SeedError> {
    let notes = [
        ("Zettelkasten Method", "A personal tool for thinking and writing. Notes are atomic, densely linked and carry unique identifiers.", NoteType::Permanent, "learning", &["knowledge-management", "productivity", "writing"][..], 5, Some("Niklas Luhmann")),
        ("How to Take Smart Notes", "Fleeting, literature and permanent notes. Write in your own words and connect related ideas.", NoteType::Literature, "learning", &["note-taking", "books", "methodology"][..], 4, Some("Sönke Ahrens")),
        ("Atomic Habits - Key Insights", "Make it obvious, attractive, easy and satisfying. Focus on systems rather than goals.", NoteType::Permanent, "personal", &["habits", "productivity", "psychology"][..], 5, Some("James Clear")),
        ("Project: Knowledge Management System", "Notes, energy-based tasks, spaced repetition and idea incubation in one place.", NoteType::Project, "project", &["project", "system-design", "knowledge-management"][..], 3, None),
    ];

    let mut ids = Vec::new();
    for (title, content, note_type, category, tags, importance, author) in notes {
        let data = CreateNote {
            content: Some(content.to_string()),
            note_type: Some(note_type),
            category: Some(category.to_string()),
            tags: labels(tags),
            importance: Some(importance),
            author: author.map(str::to_string),
            ..CreateNote::titled(title)
        };
        ids.push(Note::create(pool, data, Uuid::new_v4()).await?.id);
    }

    for (from, to, kind, strength) in [(0, 1, "related", 5), (0, 2, "expands", 3), (1, 3, "builds_on", 4)] {
        let data = CreateConnection {
            connection_type: Some(kind.to_string()),
            strength: Some(strength),
            ..CreateConnection::between(ids[from], ids[to])
        };
        NoteConnection::create(pool, data).await?;
    }
    Ok(())
}

async fn seed_flashcards(pool: &SqlitePool) -> Result<(), SeedError> {
    let cards = [
        ("What is the Zettelkasten method?", "A personal tool for thinking and writing built from atomic, densely linked notes.", CardType::Basic, "knowledge-management"),
        ("What are the four laws of behavior change from Atomic Habits?", "Make it obvious, attractive, easy and satisfying.", CardType::Basic, "habits"),
        ("What is the {{Pomodoro Technique}}?", "Work in 25 minute intervals separated by short breaks.", CardType::Cloze, "productivity"),
        ("Name the three types of notes in the Zettelkasten method", "Fleeting notes, literature notes and permanent notes.", CardType::Qa, "knowledge-management"),
    ];

    for (front, back, card_type, category) in cards {
        let data = CreateFlashcard {
            card_type: Some(card_type),
            category: Some(category.to_string()),
            tags: labels(&[category]),
            ..CreateFlashcard::new(front, back)
        };
        Flashcard::create(pool, data, Uuid::new_v4()).await?;
    }
    Ok(())
}

async fn seed_life_areas(pool: &SqlitePool) -> Result<(), SeedError> {
    let areas = [
        ("Health & Fitness", "Physical and mental wellbeing", "bg-red-500", "Heart", 85, 75, "Run a 5K", "Morning Exercise"),
        ("Career & Work", "Professional development and achievement", "bg-blue-500", "Briefcase", 80, 65, "Learn React Native", "Daily Coding"),
    ];

    for (name, description, color, icon, target, score, goal, habit) in areas {
        let data = CreateLifeArea {
            description: Some(description.to_string()),
            color: Some(color.to_string()),
            icon: Some(icon.to_string()),
            target_score: Some(target),
            ..CreateLifeArea::named(name)
        };
        let area_id = LifeArea::create(pool, data, Uuid::new_v4()).await?.area.id;
        Goal::create(pool, area_id, CreateGoal::titled(goal), Uuid::new_v4()).await?;
        Habit::create(pool, area_id, CreateHabit::named(habit), Uuid::new_v4()).await?;
        let review = CreateAreaReview {
            review_type: Some(ReviewPeriod::Monthly),
            score: Some(score),
            ..Default::default()
        };
        AreaReview::create(pool, area_id, review, Uuid::new_v4()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn seeds_once_with_consistent_progress() {
        let db = DBService::new_in_memory().await.unwrap();
        assert!(seed_demo_data(&db.pool).await.unwrap());
        assert!(!seed_demo_data(&db.pool).await.unwrap());

        assert_eq!(InboxItem::find_all(&db.pool).await.unwrap().len(), 5);
        assert_eq!(Idea::find_all(&db.pool).await.unwrap().len(), 3);
        assert_eq!(NoteConnection::find_all(&db.pool).await.unwrap().len(), 3);
        assert_eq!(Flashcard::find_all(&db.pool).await.unwrap().len(), 4);

        let areas = LifeArea::find_all_with_items(&db.pool).await.unwrap();
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].area.current_score, 75);
        assert_eq!(areas[0].goals.len(), 1);

        let personal = Project::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Personal")
            .unwrap();
        assert_eq!(personal.progress, 50);
    }
}
