//! SOAP transport end-to-end tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use flickrkit_auth::AccessToken;
    use flickrkit_core::{Parameters, Scheme};
    use flickrkit_soap_xml::RequestEnvelope;
    use flickrkit_transport::{
        ErrorKind, ReqwestSender, Response, SOAP_CONTENT_TYPE, SoapTransport, Transport,
    };

    use crate::{StubServer, TOKEN, valid_token};

    /// In-memory log sink for a scoped subscriber.
    #[derive(Debug, Clone, Default)]
    struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn transport(server: &StubServer) -> SoapTransport {
        SoapTransport::from_config(&server.config()).expect("stub config is valid")
    }

    #[tokio::test]
    async fn test_should_echo_parameters() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let response = transport
            .post(
                "",
                &params(&[
                    ("method", "flickr.test.echo"),
                    ("foo", "bar"),
                    ("text", "cats & <dogs> \"quoted\""),
                ]),
                &valid_token(),
            )
            .await
            .expect("echo call");

        assert!(!response.is_error(), "{:?}", response.error_message());
        assert_eq!(response.status(), Some(http::StatusCode::OK));
        assert_eq!(
            response.payload_text("method").unwrap().as_deref(),
            Some("flickr.test.echo")
        );
        assert_eq!(
            response.payload_text("foo").unwrap().as_deref(),
            Some("bar")
        );
        assert_eq!(
            response.payload_text("text").unwrap().as_deref(),
            Some("cats & <dogs> \"quoted\"")
        );
    }

    #[tokio::test]
    async fn test_should_log_documents_with_debug_stream_at_default_level() {
        let server = StubServer::start().await;
        let mut config = server.config();
        config.debug_stream = true;

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap())
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let transport = SoapTransport::from_config(&config).unwrap();
        transport
            .post("", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .expect("echo call");

        let output = logs.contents();
        assert_eq!(config.log_level, "info");
        assert!(output.contains("outbound SOAP envelope"), "{output}");
        assert!(output.contains("<method>flickr.test.echo</method>"), "{output}");
        assert!(output.contains("inbound SOAP body"), "{output}");
        assert!(output.contains("x:FlickrResponse"), "{output}");
    }

    #[tokio::test]
    async fn test_should_not_log_documents_without_debug_stream() {
        let server = StubServer::start().await;
        let config = server.config();

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap())
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        transport(&server)
            .post("", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .expect("echo call");

        let output = logs.contents();
        assert!(!output.contains("outbound SOAP envelope"), "{output}");
        assert!(!output.contains("inbound SOAP body"), "{output}");
    }

    #[tokio::test]
    async fn test_should_post_signed_envelope() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        transport
            .get("", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .expect("echo call");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.method, http::Method::POST);
        assert_eq!(request.path, "/services/soap/");
        assert_eq!(request.content_type.as_deref(), Some(SOAP_CONTENT_TYPE));

        let authorization = request.authorization.as_deref().unwrap_or_default();
        assert!(authorization.starts_with("OAuth "));
        assert!(authorization.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(authorization.contains(&format!("oauth_token=\"{TOKEN}\"")));

        let envelope = RequestEnvelope::from_xml(&request.body).unwrap();
        assert_eq!(envelope.fields()[0], ("format".to_owned(), "soap2".to_owned()));
        assert_eq!(envelope.field("method"), Some("flickr.test.echo"));
    }

    #[tokio::test]
    async fn test_should_send_identical_envelopes_for_get_and_post() {
        let server = StubServer::start().await;
        let transport = transport(&server);
        let input = params(&[("method", "flickr.test.echo"), ("a", "1"), ("b", "2")]);

        let got = transport.get("", &input, &valid_token()).await.unwrap();
        let posted = transport.post("", &input, &valid_token()).await.unwrap();

        assert_eq!(got.payload(), posted.payload());

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].body, requests[1].body);
        // Fresh nonce per call.
        assert_ne!(requests[0].authorization, requests[1].authorization);
    }

    #[tokio::test]
    async fn test_should_return_login_user() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let response = transport
            .post("", &params(&[("method", "flickr.test.login")]), &valid_token())
            .await
            .unwrap();

        assert_eq!(
            response.payload_attribute("user", "id").unwrap().as_deref(),
            Some(TOKEN)
        );
        assert_eq!(
            response.payload_text("username").unwrap().as_deref(),
            Some("stub-user")
        );
    }

    #[tokio::test]
    async fn test_should_report_unknown_method_as_fault() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let response = transport
            .post("", &params(&[("method", "flickr.nope")]), &valid_token())
            .await
            .expect("faults are returned as responses");

        assert!(response.is_error());
        assert_eq!(response.error_code(), Some("112"));
        assert_eq!(
            response.error_message(),
            Some("Method \"flickr.nope\" not found")
        );
        assert_eq!(
            response.status(),
            Some(http::StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(response.payload(), None);
    }

    #[tokio::test]
    async fn test_should_reject_wrong_token_secret() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let response = transport
            .post(
                "",
                &params(&[("method", "flickr.test.login")]),
                &AccessToken::new(TOKEN, "not-the-secret"),
            )
            .await
            .unwrap();

        assert!(response.is_error());
        assert_eq!(response.error_code(), Some("96"));
    }

    #[tokio::test]
    async fn test_should_reject_unknown_token() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let response = transport
            .post(
                "",
                &params(&[("method", "flickr.test.login")]),
                &AccessToken::new("unknown-token", "whatever"),
            )
            .await
            .unwrap();

        assert!(response.is_error());
        assert_eq!(response.error_code(), Some("98"));
        assert_eq!(response.error_message(), Some("Invalid auth token"));
    }

    #[tokio::test]
    async fn test_should_reject_wrong_api_key() {
        let server = StubServer::start().await;
        let mut config = server.config();
        config.api_key = "someone-elses-key".to_owned();
        let transport = SoapTransport::from_config(&config).unwrap();

        let response = transport
            .post("", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .unwrap();

        assert_eq!(response.error_code(), Some("100"));
    }

    #[tokio::test]
    async fn test_should_fail_to_parse_non_envelope_reply() {
        let server = StubServer::start().await;
        let transport = transport(&server);

        let err = transport
            .post("/broken/", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(server.requests()[0].path, "/broken/");
    }

    #[tokio::test]
    async fn test_should_fail_when_server_is_unreachable() {
        let config = {
            let server = StubServer::start().await;
            server.config()
        };
        // Wait for the aborted listener to be closed.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let transport = SoapTransport::from_config(&config)
            .unwrap()
            .with_sender(Arc::new(ReqwestSender::with_client(client)));

        let err = transport
            .post("", &params(&[("method", "flickr.test.echo")]), &valid_token())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Http);
    }

    #[tokio::test]
    async fn test_should_share_transport_across_tasks() {
        let server = StubServer::start().await;
        let transport = Arc::new(transport(&server));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let transport = Arc::clone(&transport);
                tokio::spawn(async move {
                    let value = i.to_string();
                    let response = transport
                        .post(
                            "",
                            &params(&[("method", "flickr.test.echo"), ("n", value.as_str())]),
                            &valid_token(),
                        )
                        .await
                        .unwrap();
                    assert_eq!(response.payload_text("n").unwrap(), Some(value));
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(server.requests().len(), 8);
    }

    #[test]
    fn test_should_point_config_at_stub() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(StubServer::start());
        let config = server.config();

        assert_eq!(config.scheme, Scheme::Http);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, Some(server.addr().port()));
        assert_eq!(
            transport(&server).endpoint().url(),
            format!("http://127.0.0.1:{}/services/soap/", server.addr().port())
        );
    }
}
