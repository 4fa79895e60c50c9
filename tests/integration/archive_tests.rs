//! Integration tests for the archiver
//!
//! These tests use wiremock to serve a small mock forum and run complete
//! archive passes against it.

use forum_archive::config::{load_config, Config};
use forum_archive::crawler::Archiver;
use forum_archive::storage::{RunStatus, SqliteStorage, Storage};
use forum_archive::ArchiveError;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const LOGOUT_LINK: &str = r#"<a href="index.php?action=UserLogout&amp;t=4f2a">Logout</a>"#;

/// Matches requests for the first page of a paginated resource
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == "pageNo")
    }
}

/// Wraps content in a page rendered for a signed-in member
fn signed_in(content: &str) -> String {
    format!(
        "<html><head><title>Forum</title></head><body><div id=\"userNote\">{}</div>{}</body></html>",
        LOGOUT_LINK, content
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=UTF-8")
}

fn board_list(boards: &[(u32, &str)]) -> String {
    let items: String = boards
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<li class="board"><div class="boardlistInner"><h3 class="boardTitle"><a href="index.php?page=Board&amp;boardID={}">{}</a></h3></div></li>"#,
                id, title
            )
        })
        .collect();
    format!(r#"<ul id="boardlist">{}</ul>"#, items)
}

fn topic_table(topics: &[(u32, &str, u32)]) -> String {
    let rows: String = topics
        .iter()
        .map(|(id, title, pages)| {
            let small_pages = if *pages > 1 {
                let links: String = (1..=*pages)
                    .map(|n| {
                        format!(
                            r#"<li><a href="index.php?page=Thread&amp;threadID={}&amp;pageNo={}">{}</a></li>"#,
                            id, n, n
                        )
                    })
                    .collect();
                format!(r#"<div class="smallPages"><ul>{}</ul></div>"#, links)
            } else {
                String::new()
            };
            format!(
                r#"<tr><td class="columnTopic"><div class="topic"><p><a href="index.php?page=Thread&amp;threadID={}">{}</a></p></div>{}</td></tr>"#,
                id, title, small_pages
            )
        })
        .collect();
    format!(r#"<table class="tableList"><tbody>{}</tbody></table>"#, rows)
}

fn navigation(pages: u32) -> String {
    let items: String = (1..=pages)
        .map(|n| format!(r##"<li><a href="#">{}</a></li>"##, n))
        .collect();
    format!(r#"<div class="pageNavigation"><ul>{}</ul></div>"#, items)
}

fn message(author: &str, user_id: Option<u32>, date: &str, body: &str) -> String {
    let author = match user_id {
        Some(id) => format!(
            r#"<a href="index.php?page=User&amp;userID={}"><span>{}</span></a>"#,
            id, author
        ),
        None => format!("<span>{}</span>", author),
    };
    format!(
        r#"<div class="message">
             <div class="messageSidebar"><div class="messageAuthor"><p class="userName">{}</p></div></div>
             <div class="messageContent">
               <div class="messageHeader"><p class="smallFont light">{}</p></div>
               <div class="messageBody">{}</div>
             </div>
           </div>"#,
        author, date, body
    )
}

async fn mount_page(server: &MockServer, params: &[(&str, &str)], body: String) {
    let mut mock = Mock::given(method("GET")).and(path("/forum/index.php"));
    for (key, value) in params {
        mock = mock.and(query_param(*key, *value));
    }
    mock.respond_with(html(body)).mount(server).await;
}

async fn mount_first_page(server: &MockServer, params: &[(&str, &str)], body: String) {
    let mut mock = Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(FirstPage);
    for (key, value) in params {
        mock = mock.and(query_param(*key, *value));
    }
    mock.respond_with(html(body)).mount(server).await;
}

async fn mount_root(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/forum/"))
        .and(FirstPage)
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_empty_members(server: &MockServer) {
    mount_page(
        server,
        &[("page", "MembersList")],
        signed_in(r#"<table class="tableList"><tbody></tbody></table>"#),
    )
    .await;
}

fn create_test_config(server: &MockServer, output: &Path) -> Config {
    let mut config = load_config(
        "0929e19bf86e9ae1664310447558481638e3ff92",
        "Mozilla/5.0 (X11; Linux x86_64) Safari/537.36",
        &format!("{}/forum", server.uri()),
        None,
    )
    .expect("valid test config");
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

#[tokio::test]
async fn test_full_archive_two_level_tree() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(&server, signed_in(&board_list(&[(2, "Sub")]))).await;
    mount_first_page(
        &server,
        &[("page", "Board"), ("boardID", "2")],
        signed_in(&topic_table(&[(10, "Topic", 2)])),
    )
    .await;

    let attachment = r#"<fieldset class="attachmentFile"><a href="index.php?page=Attachment&amp;attachmentID=991">shot.png</a></fieldset>"#;
    mount_first_page(
        &server,
        &[("page", "Thread"), ("threadID", "10")],
        signed_in(&format!(
            "{}{}{}",
            navigation(2),
            message(
                "Vanessa",
                Some(42),
                "Monday, March 20th 2017, 3:37pm",
                &format!("First <b>post</b>{}", attachment)
            ),
            message("Gast", None, "Monday, March 20th 2017, 3:40pm", "Second"),
        )),
    )
    .await;
    mount_page(
        &server,
        &[("page", "Thread"), ("threadID", "10"), ("pageNo", "2")],
        signed_in(&message("Vanessa", Some(42), "sometime last week", "Third")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Attachment"))
        .and(query_param("attachmentID", "991"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-attachment".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(
        &server,
        &[("page", "MembersList")],
        signed_in(
            r#"<table class="tableList"><tbody>
                <tr><td class="columnUsername"><a href="index.php?page=User&amp;userID=42">Vanessa</a></td></tr>
                <tr><td class="columnUsername"><a href="index.php?page=User&amp;userID=43">Quiet</a></td></tr>
            </tbody></table>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        &[("page", "User"), ("userID", "42")],
        signed_in(
            r#"<div class="mainHeadline"><h2>Vanessa</h2></div>
               <div class="userAvatar"><img src="wcf/images/avatars/avatar-318.jpg" alt=""></div>
               <div class="contentBox"><h3>About</h3><p>Healer from Syrtis</p></div>
               <a href="index.php?page=UserGuestbook&amp;userID=42">Guestbook</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        &[("page", "User"), ("userID", "43")],
        signed_in(
            r#"<div class="mainHeadline"><h2>Quiet</h2></div>
               <div class="userAvatar"><img src="wcf/images/avatars/avatar-default.png" alt=""></div>
               <div class="contentBox"><p>Nothing to say</p></div>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/wcf/images/avatars/avatar-318.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JPEG-avatar".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        &[("page", "UserGuestbook"), ("userID", "42")],
        signed_in(&message(
            "Quiet",
            Some(43),
            "Tuesday, March 21st 2017, 9:05am",
            "Nice profile!",
        )),
    )
    .await;

    let config = create_test_config(&server, output.path());
    let archiver = Archiver::new(config).expect("archiver");
    let archive_path = archiver.archive_path().to_path_buf();
    let run_id = archiver.run_id();

    let summary = archiver.run().await.expect("archive run");

    assert_eq!(summary.boards.boards, 2);
    assert_eq!(summary.boards.threads, 1);
    assert_eq!(summary.boards.posts_saved, 3);
    assert_eq!(summary.members.members, 2);
    assert_eq!(summary.members.guestbook_entries, 1);
    assert_eq!(summary.downloads.completed, 2);
    assert_eq!(summary.downloads.failed, 0);
    assert_eq!(summary.statistics.posts_without_timestamp, 1);
    assert_eq!(summary.visits.boards, 2);
    assert_eq!(summary.visits.threads, 1);
    assert_eq!(summary.visits.members, 2);
    assert_eq!(summary.visits.guestbooks, 1);

    let storage = SqliteStorage::open(&archive_path).unwrap();
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.finished_at.is_some());

    let threads = storage.get_threads().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].path, "/00001 Sub/00001 Topic");

    let posts = storage.get_posts(threads[0].id).unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0].user_id, Some(42));
    assert_eq!(posts[0].username, "Vanessa");
    assert!(posts[0].timestamp.is_some());
    assert!(posts[0].message.contains("First post"));
    assert!(posts[0].message.ends_with("[attachment](attachments/991)"));
    assert_eq!(posts[1].user_id, None);
    assert_eq!(posts[1].username, "Gast");
    assert_eq!(posts[2].message, "Third");
    assert_eq!(posts[2].timestamp, None);

    let vanessa = storage.get_user(42).unwrap().expect("member 42");
    assert_eq!(vanessa.name, "Vanessa");
    assert_eq!(vanessa.profile_pic_path, "userprofilepics/318.jpg");
    assert!(vanessa.info.contains("Healer from Syrtis"));

    let quiet = storage.get_user(43).unwrap().expect("member 43");
    assert_eq!(quiet.profile_pic_path, "");

    let entries = storage.get_guestbook_entries(42).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].username, "Vanessa");
    assert_eq!(entries[0].author, Some(43));
    assert_eq!(entries[0].authorname, "Quiet");
    assert_eq!(entries[0].message, "Nice profile!");
    assert!(entries[0].timestamp.is_some());

    assert_eq!(
        std::fs::read(output.path().join("attachments/991")).unwrap(),
        b"\x89PNG-attachment"
    );
    assert_eq!(
        std::fs::read(output.path().join("userprofilepics/318.jpg")).unwrap(),
        b"JPEG-avatar"
    );
}

#[tokio::test]
async fn test_duplicate_thread_links_fetched_once() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    // The same thread is listed on the root and on a sub-board
    mount_root(
        &server,
        signed_in(&format!(
            "{}{}",
            board_list(&[(2, "Sub")]),
            topic_table(&[(10, "Shared", 1), (10, "Shared again", 1)])
        )),
    )
    .await;
    mount_first_page(
        &server,
        &[("page", "Board"), ("boardID", "2")],
        signed_in(&topic_table(&[(10, "Shared", 1)])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Thread"))
        .and(query_param("threadID", "10"))
        .respond_with(html(signed_in(&message(
            "Vanessa",
            Some(42),
            "Monday, March 20th 2017, 3:37pm",
            "Only once",
        ))))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_members(&server).await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let summary = archiver.run().await.unwrap();

    assert_eq!(summary.boards.threads, 1);
    assert_eq!(summary.boards.posts_saved, 1);

    // Sub-boards come first, so the thread is filed under the sub-board
    let storage = SqliteStorage::open(&archive_path).unwrap();
    let threads = storage.get_threads().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].path, "/00001 Sub/00001 Shared");
}

#[tokio::test]
async fn test_thread_index_spans_board_pages() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(
        &server,
        signed_in(&format!(
            "{}{}",
            navigation(2),
            topic_table(&[(10, "First", 1)])
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/"))
        .and(query_param("pageNo", "2"))
        .respond_with(html(signed_in(&topic_table(&[(11, "Second", 1)]))))
        .mount(&server)
        .await;
    for id in ["10", "11"] {
        mount_page(
            &server,
            &[("page", "Thread"), ("threadID", id)],
            signed_in(&message("Vanessa", Some(42), "Yesterday, 11:15am", "hi")),
        )
        .await;
    }
    mount_empty_members(&server).await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    archiver.run().await.unwrap();

    let storage = SqliteStorage::open(&archive_path).unwrap();
    let paths: Vec<String> = storage
        .get_threads()
        .unwrap()
        .into_iter()
        .map(|t| t.path)
        .collect();
    assert_eq!(paths, vec!["/00001 First", "/00002 Second"]);
}

#[tokio::test]
async fn test_expired_session_is_fatal() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    // Rendered for a guest: no logout link
    mount_root(
        &server,
        format!("<html><body>{}</body></html>", board_list(&[(2, "Sub")])),
    )
    .await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let run_id = archiver.run_id();

    let err = archiver.run().await.unwrap_err();
    assert!(matches!(err, ArchiveError::SessionInvalid { .. }));
    assert_eq!(err.exit_code(), 403);

    let storage = SqliteStorage::open(&archive_path).unwrap();
    assert_eq!(storage.get_run(run_id).unwrap().status, RunStatus::Failed);
    assert_eq!(storage.count_threads().unwrap(), 0);
}

#[tokio::test]
async fn test_http_failure_is_fatal() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(&server, signed_in(&board_list(&[(2, "Broken")]))).await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Board"))
        .and(query_param("boardID", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let run_id = archiver.run_id();

    let err = archiver.run().await.unwrap_err();
    assert!(matches!(err, ArchiveError::HttpStatus { status: 500, .. }));
    assert_eq!(err.exit_code(), 500);

    let storage = SqliteStorage::open(&archive_path).unwrap();
    assert_eq!(storage.get_run(run_id).unwrap().status, RunStatus::Failed);
}

#[tokio::test]
async fn test_failed_attachment_download_is_not_fatal() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(&server, signed_in(&topic_table(&[(10, "Topic", 1)]))).await;
    mount_page(
        &server,
        &[("page", "Thread"), ("threadID", "10")],
        signed_in(&message(
            "Vanessa",
            Some(42),
            "Monday, March 20th 2017, 3:37pm",
            r#"see <a href="index.php?page=Attachment&amp;attachmentID=5">file</a>"#,
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Attachment"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_empty_members(&server).await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let summary = archiver.run().await.unwrap();

    assert_eq!(summary.downloads.completed, 0);
    assert_eq!(summary.downloads.failed, 1);
    assert!(!output.path().join("attachments/5").exists());

    // The reference is kept even though the file is missing
    let storage = SqliteStorage::open(&archive_path).unwrap();
    let thread = &storage.get_threads().unwrap()[0];
    let posts = storage.get_posts(thread.id).unwrap();
    assert!(posts[0].message.ends_with("[attachment](attachments/5)"));
}

#[tokio::test]
async fn test_board_linked_twice_fetched_once() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(
        &server,
        signed_in(&board_list(&[(2, "Sub"), (2, "Sub mirror")])),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Board"))
        .and(query_param("boardID", "2"))
        .respond_with(html(signed_in(&topic_table(&[(10, "Topic", 1)]))))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        &[("page", "Thread"), ("threadID", "10")],
        signed_in(&message("Vanessa", Some(42), "Yesterday, 11:15am", "hi")),
    )
    .await;
    mount_empty_members(&server).await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let summary = archiver.run().await.unwrap();

    assert_eq!(summary.boards.boards, 2);
    assert_eq!(summary.boards.threads, 1);
    assert_eq!(summary.visits.boards, 2);

    let storage = SqliteStorage::open(&archive_path).unwrap();
    let threads = storage.get_threads().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].path, "/00001 Sub/00001 Topic");
}

#[tokio::test]
async fn test_members_and_guestbook_span_pages() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    mount_root(&server, signed_in("")).await;
    mount_first_page(
        &server,
        &[("page", "MembersList")],
        signed_in(&format!(
            r#"<table class="tableList"><tbody>
                <tr><td class="columnUsername"><a href="index.php?page=User&amp;userID=42">Vanessa</a></td></tr>
            </tbody></table>{}"#,
            navigation(2)
        )),
    )
    .await;
    mount_page(
        &server,
        &[("page", "MembersList"), ("pageNo", "2")],
        signed_in(
            r#"<table class="tableList"><tbody>
                <tr><td class="columnUsername"><a href="index.php?page=User&amp;userID=43">Quiet</a></td></tr>
            </tbody></table>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        &[("page", "User"), ("userID", "42")],
        signed_in(
            r#"<div id="userPanel"><a href="index.php?page=UserGuestbook&amp;userID=1">My guestbook</a></div>
               <div class="mainHeadline"><h2>Vanessa</h2></div>
               <div class="contentBox"><p>Healer</p></div>
               <a href="index.php?page=UserGuestbook&amp;userID=42">Guestbook</a>"#,
        ),
    )
    .await;
    mount_page(
        &server,
        &[("page", "User"), ("userID", "43")],
        signed_in(
            r#"<div id="userPanel"><a href="index.php?page=UserGuestbook&amp;userID=1">My guestbook</a></div>
               <div class="mainHeadline"><h2>Quiet</h2></div>"#,
        ),
    )
    .await;
    mount_first_page(
        &server,
        &[("page", "UserGuestbook"), ("userID", "42")],
        signed_in(&format!(
            "{}{}",
            navigation(2),
            message("Quiet", Some(43), "Tuesday, March 21st 2017, 9:05am", "Hello")
        )),
    )
    .await;
    mount_page(
        &server,
        &[("page", "UserGuestbook"), ("userID", "42"), ("pageNo", "2")],
        signed_in(&message("Gast", None, "Monday, March 20th 2017, 3:37pm", "Older")),
    )
    .await;
    // The signed-in viewer's own guestbook is linked on every page
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "UserGuestbook"))
        .and(query_param("userID", "1"))
        .respond_with(html(signed_in("")))
        .expect(0)
        .mount(&server)
        .await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let summary = archiver.run().await.unwrap();

    assert_eq!(summary.members.members, 2);
    assert_eq!(summary.members.guestbook_entries, 2);
    assert_eq!(summary.visits.members, 2);
    assert_eq!(summary.visits.guestbooks, 1);

    let storage = SqliteStorage::open(&archive_path).unwrap();
    assert!(storage.get_user(43).unwrap().is_some());

    let entries = storage.get_guestbook_entries(42).unwrap();
    let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Hello", "Older"]);
    assert_eq!(entries[1].author, None);
    assert_eq!(entries[1].authorname, "Gast");
}

#[tokio::test]
async fn test_shared_attachment_downloaded_once() {
    let server = MockServer::start().await;
    let output = tempfile::tempdir().unwrap();

    let link = r#"<a href="index.php?page=Attachment&amp;attachmentID=7">map.png</a>"#;
    mount_root(&server, signed_in(&topic_table(&[(10, "Topic", 1)]))).await;
    mount_page(
        &server,
        &[("page", "Thread"), ("threadID", "10")],
        signed_in(&format!(
            "{}{}",
            message("Vanessa", Some(42), "Yesterday, 11:15am", &format!("look {}", link)),
            message("Quiet", Some(43), "Yesterday, 11:20am", &format!("again {}", link)),
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/index.php"))
        .and(query_param("page", "Attachment"))
        .and(query_param("attachmentID", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PNG-map".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_members(&server).await;

    let archiver = Archiver::new(create_test_config(&server, output.path())).unwrap();
    let archive_path = archiver.archive_path().to_path_buf();
    let summary = archiver.run().await.unwrap();

    assert_eq!(summary.downloads.completed, 1);
    assert_eq!(summary.downloads.failed, 0);
    assert_eq!(
        std::fs::read(output.path().join("attachments/7")).unwrap(),
        b"PNG-map"
    );

    // Both posts keep their reference to the single file
    let storage = SqliteStorage::open(&archive_path).unwrap();
    let thread = &storage.get_threads().unwrap()[0];
    let posts = storage.get_posts(thread.id).unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts
        .iter()
        .all(|p| p.message.ends_with("[attachment](attachments/7)")));
}
