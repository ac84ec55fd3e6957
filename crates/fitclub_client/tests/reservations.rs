use chrono::NaiveDate;
use fitclub_client::http_client::ReqwestClubClient;
use fitclub_client::{ClubApiError, ClubClient, Credential};
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ReqwestClubClient {
    ReqwestClubClient::new(
        &server.uri(),
        Credential {
            username: "alice@example.com".into(),
            password: SecretString::new("hunter2".into()),
            member_number: None,
        },
    )
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v2/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "t"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user-profile/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"memberDetails": {"memberId": "m-1"}}),
        ))
        .mount(server)
        .await;
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
    )
}

#[tokio::test]
async fn fetch_reservations_scopes_query_and_parses() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let body = serde_json::json!({"results": [
        {
            "id": "r-2",
            "eventName": "Lap Swim",
            "start": "2025-06-03T07:00:00Z",
            "end": "2025-06-03T08:00:00Z"
        },
        {
            "id": "r-1",
            "eventName": "Yoga Flow",
            "reservationType": "Class",
            "instructors": [{"name": "Sam"}],
            "location": "Studio 2",
            "locationName": "Downtown Club",
            "start": "2025-06-02T10:00:00Z",
            "end": "2025-06-02T11:00:00Z"
        }
    ]});
    Mock::given(method("GET"))
        .and(path("/ux/web-schedules/v3/reservations"))
        .and(query_param("memberIds", "m-1"))
        .and(query_param("start", "2025-06-01"))
        .and(query_param("end", "2025-07-01"))
        .and(query_param("groupCamps", "true"))
        .and(query_param("pageSize", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let (start, end) = window();
    let reservations = client(&server)
        .fetch_reservations(start, end)
        .await
        .expect("reservations");

    // Ordered by start time regardless of upstream order.
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].id, "r-1");
    assert_eq!(reservations[0].name, "Yoga Flow");
    assert_eq!(reservations[0].instructors, vec!["Sam".to_string()]);
    assert_eq!(reservations[1].id, "r-2");
}

#[tokio::test]
async fn fetch_reservations_missing_results_is_malformed() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/ux/web-schedules/v3/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"total": 0})))
        .mount(&server)
        .await;

    let (start, end) = window();
    let result = client(&server).fetch_reservations(start, end).await;
    assert!(matches!(result, Err(ClubApiError::MalformedResponse(_))));
}

#[tokio::test]
async fn fetch_reservations_403_is_unauthorized() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/ux/web-schedules/v3/reservations"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (start, end) = window();
    let result = client(&server).fetch_reservations(start, end).await;
    assert!(matches!(result, Err(ClubApiError::Unauthorized)));
}
