use axum::body::to_bytes;
use axum::Router;
use brello::http::{self as dev, DevApi};
use serde_json::{json, Value};

#[tokio::test]
async fn acceptance_healthz() {
    let app: Router = dev::app(DevApi::new());
    let res = request(&app, "GET", "/healthz", None, None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn acceptance_signup_confirm_login() {
    let api = DevApi::new();
    let app: Router = dev::app(api.clone());

    let res = request(&app, "POST", "/users", None, Some(json!({ "email": "ada@example.com", "password": "pw" }))).await;
    assert_eq!(res.status(), 201);
    let res = request(&app, "POST", "/users", None, Some(json!({ "email": "ada@example.com", "password": "pw" }))).await;
    assert_eq!(res.status(), 400);
    assert_eq!(body(res).await["detail"], "Email already registered");

    let res = login(&app, "ada@example.com", "pw").await;
    assert_eq!(res.status(), 401);
    assert_eq!(body(res).await["detail"], "Email not confirmed");

    let token = api.confirmation_token_for("ada@example.com").unwrap();
    let res = request(&app, "GET", &format!("/confirm/{}", token), None, None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await["message"], "Email confirmed successfully");
    let res = request(&app, "GET", &format!("/confirm/{}", token), None, None).await;
    assert_eq!(body(res).await["message"], "Email already confirmed");

    let res = login(&app, "ada@example.com", "nope").await;
    assert_eq!(res.status(), 401);
    let res = login(&app, "ada@example.com", "pw").await;
    assert_eq!(res.status(), 200);
    let body = body(res).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn acceptance_board_list_task_lifecycle() {
    let api = DevApi::new();
    let app: Router = dev::app(api.clone());
    let token = signed_in(&app, &api, "ada@example.com").await;
    let auth = Some(token.as_str());

    let res = request(&app, "GET", "/boards", None, None).await;
    assert_eq!(res.status(), 401);

    // board
    let res = request(&app, "POST", "/boards", auth, Some(json!({ "title": "Roadmap", "background_color": "#0079BF" }))).await;
    assert_eq!(res.status(), 201);
    let board = body(res).await["id"].as_i64().unwrap();

    // lists
    let todo = create(&app, auth, &format!("/boards/{}/todo_lists", board), json!({ "title": "Todo" })).await;
    let done = create(&app, auth, &format!("/boards/{}/todo_lists", board), json!({ "title": "Done" })).await;
    let res = request(&app, "GET", &format!("/boards/{}/todo_lists", board), auth, None).await;
    let lists = body(res).await;
    assert_eq!(lists.as_array().unwrap().len(), 2);
    assert_eq!(lists[0]["board_id"], board);

    // tasks
    let a = create(&app, auth, &format!("/todo_lists/{}/tasks", todo), json!({ "title": "a" })).await;
    let b = create(&app, auth, &format!("/todo_lists/{}/tasks", todo), json!({ "title": "b", "description": "second" })).await;
    assert_eq!(task_ids(&app, auth, todo).await, vec![a, b]);

    // reorder
    let res = request(&app, "PUT", &format!("/todo_lists/{}/reorder", todo), auth, Some(json!({ "task_ids": [b, a] }))).await;
    assert_eq!(res.status(), 200);
    assert_eq!(task_ids(&app, auth, todo).await, vec![b, a]);
    let res = request(&app, "PUT", &format!("/todo_lists/{}/reorder", todo), auth, Some(json!({ "task_ids": [b] }))).await;
    assert_eq!(res.status(), 400);

    // move
    let res = request(&app, "PUT", &format!("/tasks/{}", b), auth, Some(json!({ "title": "b", "description": "second", "todo_list_id": done }))).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await["todo_list_id"], done);
    assert_eq!(task_ids(&app, auth, todo).await, vec![a]);
    assert_eq!(task_ids(&app, auth, done).await, vec![b]);

    // delete cascades
    let res = request(&app, "DELETE", &format!("/todo_lists/{}", done), auth, None).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "DELETE", &format!("/tasks/{}", b), auth, None).await;
    assert_eq!(res.status(), 404);
    assert_eq!(body(res).await["detail"], "Task not found");

    let res = request(&app, "DELETE", &format!("/boards/{}", board), auth, None).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "GET", &format!("/todo_lists/{}/tasks", todo), auth, None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn acceptance_sharing() {
    let api = DevApi::new();
    let app: Router = dev::app(api.clone());
    let ada = signed_in(&app, &api, "ada@example.com").await;
    let bob = signed_in(&app, &api, "bob@example.com").await;

    let board = create(&app, Some(&ada), "/boards", json!({ "title": "Shared", "background_color": "#519839" })).await;
    let res = request(&app, "POST", &format!("/boards/{}/share", board), Some(&ada), Some(json!({ "email": "bob@example.com" }))).await;
    assert_eq!(res.status(), 200);
    let res = request(&app, "POST", &format!("/boards/{}/share", board), Some(&ada), Some(json!({ "email": "bob@example.com" }))).await;
    assert_eq!(body(res).await["detail"], "Board already shared with this user");

    let res = request(&app, "GET", "/boards", Some(&bob), None).await;
    assert_eq!(body(res).await[0]["title"], "Shared");

    let res = request(&app, "PUT", &format!("/boards/{}", board), Some(&bob), Some(json!({ "title": "Mine", "background_color": "#519839" }))).await;
    assert_eq!(res.status(), 404);
    let res = request(&app, "POST", &format!("/boards/{}/share", board), Some(&bob), Some(json!({ "email": "nobody@example.com" }))).await;
    assert_eq!(res.status(), 404);
    assert_eq!(body(res).await["detail"], "Board not found");
    let list = create(&app, Some(&bob), &format!("/boards/{}/todo_lists", board), json!({ "title": "From Bob" })).await;
    assert!(list > 0);
}

async fn signed_in(app: &Router, api: &DevApi, email: &str) -> String {
    let res = request(app, "POST", "/users", None, Some(json!({ "email": email, "password": "pw" }))).await;
    assert_eq!(res.status(), 201);
    let token = api.confirmation_token_for(email).unwrap();
    request(app, "GET", &format!("/confirm/{}", token), None, None).await;
    let res = login(app, email, "pw").await;
    body(res).await["access_token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, auth: Option<&str>, path: &str, payload: Value) -> i64 {
    let res = request(app, "POST", path, auth, Some(payload)).await;
    assert_eq!(res.status(), 201);
    body(res).await["id"].as_i64().unwrap()
}

async fn task_ids(app: &Router, auth: Option<&str>, list: i64) -> Vec<i64> {
    let res = request(app, "GET", &format!("/todo_lists/{}/tasks", list), auth, None).await;
    assert_eq!(res.status(), 200);
    body(res).await.as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect()
}

async fn body(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let form = format!("username={}&password={}", email.replace('@', "%40"), password);
    let req = Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn request(app: &Router, method: &str, path: &str, bearer: Option<&str>, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let mut req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    if let Some(token) = bearer {
        req = req.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}
