use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::DeploymentImpl;

pub mod ai_assistant;
pub mod health;
pub mod ideas;
pub mod inbox;
pub mod knowledge;
pub mod life_areas;
pub mod spaced_repetition;
pub mod tasks;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .merge(health::router(&deployment))
        .merge(inbox::router(&deployment))
        .merge(tasks::router(&deployment))
        .merge(ideas::router(&deployment))
        .merge(knowledge::router(&deployment))
        .merge(spaced_repetition::router(&deployment))
        .merge(life_areas::router(&deployment))
        .merge(ai_assistant::router(&deployment));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use deployment::Deployment;
    use local_deployment::LocalDeployment;
    use serde_json::{Value, json};
    use services::services::{
        ai_client::{ChatCompletion, ChatCompletionProvider, ChatProviderError, ChatRequest},
        config::AppConfig,
    };
    use tower::ServiceExt;

    use super::*;

    struct StubProvider {
        fail: bool,
    }

    #[async_trait]
    impl ChatCompletionProvider for StubProvider {
        async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatProviderError> {
            if self.fail {
                return Err(ChatProviderError::Http {
                    status: 503,
                    body: "upstream secret detail".into(),
                });
            }
            let last = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(ChatCompletion {
                content: format!("echo: {last}"),
                model: "stub-model".into(),
                usage: None,
            })
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    async fn app_with(fail: bool) -> (Router, DeploymentImpl) {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let deployment = LocalDeployment::with_provider(config, Arc::new(StubProvider { fail }))
            .await
            .unwrap();
        (router(deployment.clone()), deployment)
    }

    async fn app() -> Router {
        app_with(false).await.0
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn inbox_post_applies_defaults_and_is_listed() {
        let app = app().await;
        let (status, created) = send(&app, Method::POST, "/api/inbox", Some(json!({"title": "X"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["success"], true);
        assert_eq!(created["data"]["status"], "unprocessed");
        assert_eq!(created["data"]["priority"], "medium");
        assert_eq!(created["data"]["tags"], json!([]));

        let (_, listed) = send(&app, Method::GET, "/api/inbox?search=x", None).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["data"][0]["title"], "X");
    }

    #[tokio::test]
    async fn inbox_put_is_idempotent() {
        let app = app().await;
        let (_, created) = send(&app, Method::POST, "/api/inbox", Some(json!({"title": "Call bank"}))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let change = json!({"id": id, "title": "Call bank today", "priority": "high"});
        let (_, first) = send(&app, Method::PUT, "/api/inbox", Some(change.clone())).await;
        let (status, second) = send(&app, Method::PUT, "/api/inbox", Some(change)).await;
        assert_eq!(status, StatusCode::OK);
        for field in ["id", "title", "priority", "status", "tags", "createdAt"] {
            assert_eq!(first["data"][field], second["data"][field], "{field}");
        }
    }

    #[tokio::test]
    async fn inbox_rejects_missing_title_and_unknown_ids() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/api/inbox", Some(json!({"title": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, Method::DELETE, "/api/inbox?id=not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/api/inbox", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ID is required");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/inbox")
            .header("content-type", "application/json")
            .body(Body::from("{\"title\":"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body["error"], "Malformed JSON");
    }

    #[tokio::test]
    async fn deleted_task_is_gone_and_second_delete_is_404() {
        let app = app().await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"itemType": "task", "title": "Write report"})),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/tasks?id={id}&type=task");
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) = send(&app, Method::GET, "/api/tasks", None).await;
        assert_eq!(listed["data"]["tasks"], json!([]));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Task not found");
    }

    #[tokio::test]
    async fn completing_third_of_four_tasks_sets_progress_75() {
        let app = app().await;
        let (_, project) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"itemType": "project", "name": "X"})),
        )
        .await;
        let project_id = project["data"]["id"].as_str().unwrap().to_string();

        let mut ids = Vec::new();
        for i in 0..4 {
            let (_, task) = send(
                &app,
                Method::POST,
                "/api/tasks",
                Some(json!({"itemType": "task", "title": format!("step {i}"), "projectId": project_id})),
            )
            .await;
            ids.push(task["data"]["id"].as_str().unwrap().to_string());
        }

        let mut progress = Vec::new();
        for id in &ids[..3] {
            let (status, _) = send(
                &app,
                Method::PUT,
                "/api/tasks",
                Some(json!({"itemType": "task", "id": id, "status": "completed"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);

            let (_, listed) = send(&app, Method::GET, "/api/tasks", None).await;
            progress.push(listed["data"]["projects"][0]["progress"].clone());
        }
        assert_eq!(progress, vec![json!(25), json!(50), json!(75)]);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/tasks",
            Some(json!({"itemType": "project", "id": project_id, "progress": 10, "status": "paused"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["progress"], 75);
        assert_eq!(body["data"]["status"], "paused");

        let (_, listed) = send(&app, Method::GET, "/api/tasks?status=completed", None).await;
        assert_eq!(listed["total"], 3);
        assert_eq!(listed["data"]["projects"][0]["tasks"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn project_name_on_a_task_points_to_project_id() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"itemType": "task", "title": "Draft", "project": "Work"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Use projectId to link a task to a project");

        let (_, listed) = send(&app, Method::GET, "/api/tasks", None).await;
        assert_eq!(listed["data"]["tasks"], json!([]));
    }

    #[tokio::test]
    async fn idea_connections_must_exist() {
        let app = app().await;
        let (_, hub) = send(&app, Method::POST, "/api/ideas", Some(json!({"title": "Hub"}))).await;
        let (_, spoke) = send(&app, Method::POST, "/api/ideas", Some(json!({"title": "Spoke"}))).await;
        let hub = hub["data"]["id"].as_str().unwrap().to_string();
        let spoke = spoke["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/ideas",
            Some(json!({"id": hub, "connections": [spoke, uuid::Uuid::new_v4()]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Connected idea not found");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/ideas",
            Some(json!({"id": hub, "connections": [spoke, hub, spoke]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["connections"], json!([spoke]));
    }

    #[tokio::test]
    async fn invalid_item_type_is_rejected() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({"itemType": "habit", "title": "Stretch"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid item type");

        let (status, body) = send(&app, Method::DELETE, "/api/tasks?type=task", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "ID and type are required");
    }

    #[tokio::test]
    async fn ideas_overview_groups_by_quadrant() {
        let app = app().await;
        for (title, impact, effort) in [("Newsletter", 8, 3), ("Rewrite app", 9, 9), ("Tidy", 2, 2)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/ideas",
                Some(json!({"title": title, "impact": impact, "effort": effort})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, Method::GET, "/api/ideas", None).await;
        let quadrants = &body["data"]["quadrants"];
        assert_eq!(quadrants["quick-wins"][0]["title"], "Newsletter");
        assert_eq!(quadrants["major-projects"][0]["title"], "Rewrite app");
        assert_eq!(quadrants["fill-ins"][0]["title"], "Tidy");
        assert_eq!(body["data"]["stats"]["total"], 3);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ideas",
            Some(json!({"title": "Too big", "impact": 11})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Impact must be between 1 and 10");
    }

    #[tokio::test]
    async fn knowledge_connections_are_unique_and_removable() {
        let app = app().await;
        let (_, a) = send(&app, Method::POST, "/api/knowledge", Some(json!({"title": "Zettelkasten"}))).await;
        let (_, b) = send(&app, Method::POST, "/api/knowledge", Some(json!({"title": "Spaced repetition"}))).await;
        let a = a["data"]["id"].as_str().unwrap().to_string();
        let b = b["data"]["id"].as_str().unwrap().to_string();

        let link = json!({"action": "create_connection", "from": a, "to": b});
        let (status, created) = send(&app, Method::PATCH, "/api/knowledge", Some(link)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["data"]["type"], "related");

        let reverse = json!({"action": "create_connection", "from": b, "to": a});
        let (status, body) = send(&app, Method::PATCH, "/api/knowledge", Some(reverse)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Connection already exists");

        let (_, detail) = send(&app, Method::GET, &format!("/api/knowledge?noteId={a}"), None).await;
        assert_eq!(detail["data"]["connectedNotes"][0]["id"], b.as_str());

        let unlink = json!({"action": "delete_connection", "from": b, "to": a});
        let (status, body) = send(&app, Method::PATCH, "/api/knowledge", Some(unlink.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Connection deleted successfully");

        let (status, _) = send(&app, Method::PATCH, "/api/knowledge", Some(unlink)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::PATCH, "/api/knowledge", Some(json!({"action": "merge"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action");
    }

    #[tokio::test]
    async fn chat_returns_bare_reply_with_intent() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/ai-assistant/chat",
            Some(json!({"message": "Can you analyze this idea?", "currentSection": "ideas-garden"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "echo: Can you analyze this idea?");
        assert_eq!(body["type"], "idea-analysis");
        assert_eq!(body["metadata"]["model"], "stub-model");
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn chat_errors_use_the_envelope() {
        let (app, deployment) = app_with(true).await;
        assert_eq!(deployment.assistant().provider_name(), "stub");

        let (status, body) = send(&app, Method::POST, "/api/ai-assistant/chat", Some(json!({"message": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");

        let (status, body) = send(&app, Method::POST, "/api/ai-assistant/chat", Some(json!({"message": "hello"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to get AI response");
        assert!(!body.to_string().contains("upstream secret detail"));
    }

    #[tokio::test]
    async fn flashcards_are_reviewed_and_reset() {
        let app = app().await;
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/spaced-repetition",
            Some(json!({"front": "What is 2+2?", "back": "4", "tags": ["math"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["message"], "Flashcard created successfully");
        assert_eq!(created["data"]["type"], "basic");
        assert_eq!(created["data"]["status"], "new");
        assert_eq!(created["data"]["easeFactor"], 2.5);
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&app, Method::GET, "/api/spaced-repetition?dueOnly=true", None).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["data"]["stats"]["due"], 1);
        assert_eq!(listed["data"]["dueCards"][0]["id"], id.as_str());

        let (_, next) = send(&app, Method::PATCH, "/api/spaced-repetition", Some(json!({"action": "get_next_card"}))).await;
        assert_eq!(next["data"]["id"], id.as_str());
        assert_eq!(next["message"], "Next card retrieved successfully");

        let (status, reviewed) = send(
            &app,
            Method::PATCH,
            "/api/spaced-repetition",
            Some(json!({"action": "submit_review", "cardId": id, "rating": "good", "responseTime": 1200})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reviewed["message"], "Review submitted successfully");
        assert_eq!(reviewed["data"]["updatedCard"]["interval"], 1);
        assert_eq!(reviewed["data"]["updatedCard"]["reviews"], 1);
        assert_eq!(reviewed["data"]["reviewSession"]["rating"], "good");

        let (_, next) = send(&app, Method::PATCH, "/api/spaced-repetition", Some(json!({"action": "get_next_card"}))).await;
        assert_eq!(next["success"], true);
        assert!(next["data"].is_null());
        assert_eq!(next["message"], "No cards due for review");

        let (_, reset) = send(
            &app,
            Method::PATCH,
            "/api/spaced-repetition",
            Some(json!({"action": "reset_card", "cardId": id})),
        )
        .await;
        assert_eq!(reset["message"], "Card reset successfully");
        assert_eq!(reset["data"]["interval"], 0);
        assert_eq!(reset["data"]["status"], "new");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/spaced-repetition?id={id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn flashcard_errors() {
        let app = app().await;
        let (status, body) = send(&app, Method::POST, "/api/spaced-repetition", Some(json!({"front": " ", "back": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let missing = uuid::Uuid::new_v4();
        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/spaced-repetition",
            Some(json!({"action": "submit_review", "cardId": missing, "rating": "easy"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Card not found");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/spaced-repetition",
            Some(json!({"action": "submit_review", "cardId": missing, "rating": "perfect"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::PUT, "/api/spaced-repetition", Some(json!({"id": missing, "front": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Flashcard not found");

        let (status, body) = send(&app, Method::PATCH, "/api/spaced-repetition", Some(json!({"action": "shuffle"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action");
    }

    #[tokio::test]
    async fn life_area_items_are_action_dispatched() {
        let app = app().await;
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/life-areas",
            Some(json!({"action": "create_area", "name": "Health & Fitness", "targetScore": 90})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["message"], "Life area created successfully");
        assert_eq!(created["data"]["currentScore"], 50);
        assert_eq!(created["data"]["goals"], json!([]));
        let area = created["data"]["id"].as_str().unwrap().to_string();

        let (_, goal) = send(
            &app,
            Method::POST,
            "/api/life-areas",
            Some(json!({"action": "add_goal", "areaId": area, "goalData": {"title": "Run 5k"}})),
        )
        .await;
        assert_eq!(goal["message"], "Goal added successfully");
        assert_eq!(goal["data"]["status"], "active");
        let goal_id = goal["data"]["id"].as_str().unwrap().to_string();

        let (_, habit) = send(
            &app,
            Method::POST,
            "/api/life-areas",
            Some(json!({"action": "add_habit", "areaId": area, "habitData": {"name": "Stretch"}})),
        )
        .await;
        assert_eq!(habit["message"], "Habit added successfully");

        let (_, review) = send(
            &app,
            Method::POST,
            "/api/life-areas",
            Some(json!({"action": "add_review", "areaId": area, "reviewData": {"type": "monthly", "score": 70}})),
        )
        .await;
        assert_eq!(review["message"], "Review added successfully");

        let (_, updated) = send(
            &app,
            Method::PUT,
            "/api/life-areas",
            Some(json!({"action": "update_goal", "areaId": area, "goalId": goal_id, "updates": {"status": "completed"}})),
        )
        .await;
        assert_eq!(updated["message"], "Goal updated successfully");
        assert!(updated["data"]["completedAt"].is_string());

        let (_, listed) = send(&app, Method::GET, "/api/life-areas?search=fitness", None).await;
        assert_eq!(listed["total"], 1);
        assert_eq!(listed["data"]["stats"]["overallScore"], 70);
        assert_eq!(listed["data"]["stats"]["totalGoals"], 1);
        assert_eq!(listed["data"]["stats"]["activeGoals"], 0);
        assert_eq!(listed["data"]["stats"]["byCategory"]["health"], 1);

        let (_, detail) = send(&app, Method::GET, &format!("/api/life-areas?areaId={area}"), None).await;
        assert_eq!(detail["data"]["habits"][0]["name"], "Stretch");
        assert_eq!(detail["data"]["reviews"][0]["type"], "monthly");

        let uri = format!("/api/life-areas?action=delete_goal&areaId={area}&itemId={goal_id}");
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Goal deleted successfully");
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Goal not found");

        let uri = format!("/api/life-areas?action=delete_area&areaId={area}");
        let (_, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(body["message"], "Life area deleted successfully");
        let (_, listed) = send(&app, Method::GET, "/api/life-areas", None).await;
        assert_eq!(listed["total"], 0);
    }

    #[tokio::test]
    async fn life_area_errors() {
        let app = app().await;
        let missing = uuid::Uuid::new_v4();

        let (status, body) = send(&app, Method::DELETE, "/api/life-areas?action=delete_area", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Action and areaId are required");

        let (status, body) = send(&app, Method::DELETE, &format!("/api/life-areas?action=delete_goal&areaId={missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Life area not found");

        let (_, created) = send(&app, Method::POST, "/api/life-areas", Some(json!({"action": "create_area", "name": "Career"}))).await;
        let area = created["data"]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, Method::DELETE, &format!("/api/life-areas?action=delete_goal&areaId={area}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action or missing itemId");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/life-areas",
            Some(json!({"action": "add_goal", "areaId": missing, "goalData": {"title": "x"}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Life area not found");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/life-areas",
            Some(json!({"action": "update_habit", "areaId": area, "habitId": missing, "updates": {}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Habit not found");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/life-areas",
            Some(json!({"action": "update_area", "areaId": area, "updates": {"currentScore": 150}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::POST, "/api/life-areas", Some(json!({"action": "archive"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action");
    }
}
