use mock_server::{MockConfig, DEFAULT_EMAIL, DEFAULT_PASSWORD};
use petfriends_core::{Credentials, PetFriends, ReqwestTransport};

/// Start the mock server on a random port and return its base URL.
pub fn spawn_mock(config: MockConfig) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn client(base_url: &str) -> PetFriends<ReqwestTransport> {
    PetFriends::new(base_url, ReqwestTransport::new().unwrap())
}

pub fn mock_credentials() -> Credentials {
    Credentials::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
}
