#[cfg(test)]
mod tests {
    use ksql_core::{
        Client, ClientConfig, CreateAsDef, ErrorKind, KsqlError, QueryOptions, Result,
        SessionProperties, ValueFormat, stream::TryStreamExt,
    };
    use ksql_http::HttpTransport;
    use ksql_tests::{execute_tests, init_logs};
    use serde_json::{Value, json};
    use std::{env, pin::pin, time::Duration};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
        time::sleep,
    };

    /// How the local server answers one connection.
    enum Answer {
        Full { status: u16, body: String },
        Chunked { chunks: Vec<&'static str>, stall: bool },
        /// Chunked head followed by these raw writes, chunk framing included.
        Raw(Vec<&'static str>),
        Silent,
    }

    impl Answer {
        fn json(status: u16, document: Value) -> Self {
            Answer::Full {
                status,
                body: document.to_string(),
            }
        }

        async fn write(self, mut socket: TcpStream) {
            let _ = socket.set_nodelay(true);
            match self {
                Answer::Full { status, body } => {
                    let response = format!(
                        "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
                Answer::Chunked { chunks, stall } => {
                    let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
                    let _ = socket.write_all(head.as_bytes()).await;
                    for chunk in chunks {
                        let frame = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
                        let _ = socket.write_all(frame.as_bytes()).await;
                        let _ = socket.flush().await;
                        sleep(Duration::from_millis(20)).await;
                    }
                    if stall {
                        sleep(Duration::from_secs(30)).await;
                    }
                    let _ = socket.write_all(b"0\r\n\r\n").await;
                }
                Answer::Raw(writes) => {
                    let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
                    let _ = socket.write_all(head.as_bytes()).await;
                    for write in writes {
                        let _ = socket.write_all(write.as_bytes()).await;
                        let _ = socket.flush().await;
                        sleep(Duration::from_millis(100)).await;
                    }
                }
                Answer::Silent => {
                    sleep(Duration::from_secs(30)).await;
                }
            }
            let _ = socket.shutdown().await;
        }
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0; 1024];
        loop {
            let n = socket.read(&mut chunk).await.expect("Could not read the request");
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buffer);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buffer.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Serve `answers` in order, one connection each. The handle resolves to
    /// the raw requests once every answer was used.
    async fn serve(answers: Vec<Answer>) -> (String, JoinHandle<Vec<String>>) {
        init_logs();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Could not bind the listener");
        let url = format!(
            "http://{}",
            listener.local_addr().expect("Listener has no address")
        );
        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for answer in answers {
                let (mut socket, _) = listener.accept().await.expect("Could not accept");
                requests.push(read_request(&mut socket).await);
                tokio::spawn(answer.write(socket));
            }
            requests
        });
        (url, handle)
    }

    fn connect(url: &str) -> Result<Client<HttpTransport>> {
        let config = ClientConfig::from_url(url)?;
        let transport = HttpTransport::new(&config)?;
        Ok(Client::new(transport, config))
    }

    fn success() -> Value {
        json!([{
            "currentStatus": {
                "statementText": "CREATE STREAM ...",
                "commandStatus": { "status": "SUCCESS", "message": "Stream created" }
            }
        }])
    }

    #[tokio::test]
    async fn ksql() {
        let document = json!([{ "@type": "streams", "streams": [] }]);
        let (url, server) = serve(vec![Answer::json(200, document.clone())]).await;
        let client = connect(&url).expect("Could not connect");
        let result = client
            .ksql("SHOW STREAMS", SessionProperties::new())
            .await
            .expect("Should succeed");
        assert_eq!(result, document);

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("POST /ksql HTTP/1.1\r\n"), "{}", request);
        let lowercase = request.to_ascii_lowercase();
        assert!(lowercase.contains("\r\naccept: application/json\r\n"));
        assert!(lowercase.contains("\r\ncontent-type: application/json\r\n"));
        let body: Value = serde_json::from_str(&request[request.find("\r\n\r\n").unwrap() + 4..])
            .expect("The body should be JSON");
        assert_eq!(
            body,
            json!({ "ksql": "SHOW STREAMS;", "streamsProperties": {} })
        );
    }

    #[tokio::test]
    async fn create_stream() {
        let (url, server) = serve(vec![Answer::json(200, success())]).await;
        let client = connect(&url).expect("Could not connect");
        let created = client
            .create_stream("s1", [("id", "INT")], "topic1", ValueFormat::Json)
            .await
            .expect("Should succeed");
        assert!(created);
        let requests = server.await.unwrap();
        assert!(requests[0].contains(
            r#""ksql":"CREATE STREAM s1 (id INT) WITH (kafka_topic='topic1', value_format='JSON');""#
        ));
    }

    #[tokio::test]
    async fn other_statuses() {
        let (url, _server) = serve(vec![Answer::json(
            400,
            json!({ "@type": "statement_error", "message": "mismatched input" }),
        )])
        .await;
        let client = connect(&url).expect("Could not connect");
        let error = client
            .ksql("SHOW NOTHING", SessionProperties::new())
            .await
            .expect_err("Should not succeed");
        let Some(KsqlError::Transport { status, body }) = error.downcast_ref() else {
            panic!("Expected a transport error, found {:#}", error);
        };
        assert_eq!(*status, 400);
        assert!(body.contains("mismatched input"));
    }

    #[tokio::test]
    async fn query() {
        let (url, server) = serve(vec![Answer::Chunked {
            chunks: vec![
                "\n",
                "{\"row\":{\"columns\":[1,\"User_1\"]},\"errorMessage\":null}\n",
                "\n",
                "\n",
                "{\"row\":{\"columns\":[2,\"User_2\"]},\"errorMessage\":null}\n",
            ],
            stall: false,
        }])
        .await;
        let client = connect(&url).expect("Could not connect");
        let rows: Vec<Value> = client
            .query(
                "SELECT * FROM pageviews",
                SessionProperties::new(),
                QueryOptions::default(),
            )
            .try_collect()
            .await
            .expect("Should succeed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["row"]["columns"][1], "User_2");
        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /query HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn chunk_split_across_reads() {
        let (url, _server) = serve(vec![Answer::Raw(vec![
            "1\r\n\n\r\n",
            "7\r\n{\"a\"",
            ":1}\r\n",
            "c\r\n{\"b\":\"xyz",
            "\"}\n\r\n0\r\n\r\n",
        ])])
        .await;
        let client = connect(&url).expect("Could not connect");
        let rows: Vec<Value> = client
            .query("SELECT 1", SessionProperties::new(), QueryOptions::default())
            .try_collect()
            .await
            .expect("Rows cut by the network should be joined");
        assert_eq!(rows, [json!({ "a": 1 }), json!({ "b": "xyz" })]);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let (url, _server) = serve(vec![Answer::Silent]).await;
        let client = connect(&format!("{}?timeout=0.2", url))
            .expect("Could not connect");
        let error = client
            .ksql("SHOW STREAMS", SessionProperties::new())
            .await
            .expect_err("Should not succeed");
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::Timeout), "{:#}", error);
    }

    #[tokio::test]
    async fn stalled_stream_times_out() {
        let (url, _server) = serve(vec![Answer::Chunked {
            chunks: vec!["{\"a\":1}"],
            stall: true,
        }])
        .await;
        let client = connect(&format!("{}?timeout=0.3", url))
            .expect("Could not connect");
        let mut rows = pin!(client.query(
            "SELECT 1",
            SessionProperties::new(),
            QueryOptions::default()
        ));
        assert_eq!(rows.try_next().await.unwrap(), Some(json!({ "a": 1 })));
        let error = rows.try_next().await.expect_err("Should not succeed");
        assert_eq!(ErrorKind::of(&error), Some(ErrorKind::Timeout), "{:#}", error);
    }

    #[tokio::test]
    async fn create_as_retries_timeouts() {
        let (url, server) = serve(vec![Answer::Silent, Answer::json(200, success())]).await;
        let client = connect(&format!("{}?timeout=0.2&max_retries=3", url))
            .expect("Could not connect");
        let created = client
            .create_stream_as(CreateAsDef::stream("s2", "s1"))
            .await
            .expect("Should succeed on the second attempt");
        assert!(created);
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = connect(&url).expect("Could not connect");
        let error = client
            .ksql("SHOW STREAMS", SessionProperties::new())
            .await
            .expect_err("Should not succeed");
        assert_eq!(ErrorKind::of(&error), None);
        assert!(format!("{:#}", error).contains("/ksql"));
    }

    #[test]
    fn wrong_url() {
        assert!(connect("tcp://localhost:8088").is_err());
    }

    #[tokio::test]
    async fn live() {
        let Ok(url) = env::var("KSQL_URL") else {
            return;
        };
        init_logs();
        let client = connect(&url)
            .unwrap_or_else(|e| panic!("Could not connect to `{}`: {:#}", url, e));
        execute_tests(&client).await;
    }
}
