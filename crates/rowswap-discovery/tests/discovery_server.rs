//! End-to-end exercise of the discovery protocols over real UDP sockets.

use rowswap_client::DiscoveryClient;
use rowswap_common::{Endpoint, ServiceName};
use rowswap_discovery::DiscoveryServer;
use rowswap_wire::frame;
use rowswap_wire::lookup::LookupReply;
use rowswap_wire::registration::ResultCode;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Binds a server on ephemeral ports and runs it in the background.
async fn spawn_server() -> (SocketAddr, SocketAddr) {
    let server = DiscoveryServer::bind(
        "127.0.0.1:0".parse().unwrap(),
        "127.0.0.1:0".parse().unwrap(),
    )
    .await
    .unwrap();

    let registration = server.registration_addr().unwrap();
    let lookup = server.lookup_addr().unwrap();
    tokio::spawn(server.run());
    (registration, lookup)
}

/// Sends one raw registration request and decodes the result code.
async fn send_registration(registration: SocketAddr, text: &str) -> ResultCode {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket
        .send_to(&frame::encode_text(text).unwrap(), registration)
        .await
        .unwrap();

    let mut buf = [0u8; frame::MAX_DATAGRAM];
    let (len, _) = socket.recv_from(&mut buf).await.unwrap();
    ResultCode::decode(&buf[..len]).unwrap()
}

#[tokio::test]
async fn test_register_lookup_dismiss_scenario() {
    let (registration, lookup) = spawn_server().await;
    let client = DiscoveryClient::connect(lookup).await.unwrap();
    let name = ServiceName::from("report.txt");

    // Fresh registration wins.
    assert_eq!(
        send_registration(registration, "REGISTER:report.txt:7000").await,
        ResultCode::Ok
    );

    // Second claim on the name loses, whatever the port.
    assert_eq!(
        send_registration(registration, "REGISTER:report.txt:7001").await,
        ResultCode::FilenameInUse
    );

    // Lookup resolves to the surviving entry; the sender's address was
    // inferred for the short registration form.
    let reply = client.resolve(&name).await.unwrap();
    assert_eq!(
        reply,
        LookupReply::Found(Endpoint::new("127.0.0.1".parse().unwrap(), 7000))
    );

    // Dismissal from the wrong endpoint is refused and mutates nothing.
    assert_eq!(
        send_registration(registration, "DISMISS:report.txt:7001").await,
        ResultCode::EndpointMismatch
    );
    assert!(matches!(
        client.resolve(&name).await.unwrap(),
        LookupReply::Found(_)
    ));

    // The owner dismisses; the name stops resolving.
    assert_eq!(
        send_registration(registration, "DISMISS:report.txt:7000").await,
        ResultCode::Ok
    );
    assert_eq!(client.resolve(&name).await.unwrap(), LookupReply::NotFound);
}

#[tokio::test]
async fn test_address_qualified_registration() {
    let (registration, lookup) = spawn_server().await;
    let client = DiscoveryClient::connect(lookup).await.unwrap();

    assert_eq!(
        send_registration(registration, "REGISTER:data.csv:10.9.8.7:7500").await,
        ResultCode::Ok
    );

    let reply = client.resolve(&ServiceName::from("data.csv")).await.unwrap();
    assert_eq!(
        reply,
        LookupReply::Found(Endpoint::new("10.9.8.7".parse().unwrap(), 7500))
    );
}

#[tokio::test]
async fn test_endpoint_claimed_once() {
    let (registration, _) = spawn_server().await;

    assert_eq!(
        send_registration(registration, "REGISTER:a.txt:7000").await,
        ResultCode::Ok
    );
    // Same sender, same port, different name: the endpoint is taken.
    assert_eq!(
        send_registration(registration, "REGISTER:b.txt:7000").await,
        ResultCode::EndpointInUse
    );
}

#[tokio::test]
async fn test_bad_requests_are_answered_not_fatal() {
    let (registration, lookup) = spawn_server().await;

    assert_eq!(
        send_registration(registration, "PUBLISH:report.txt:7000").await,
        ResultCode::UnknownCommand
    );
    assert_eq!(
        send_registration(registration, "REGISTER:report.txt").await,
        ResultCode::MalformedRequest
    );
    assert_eq!(
        send_registration(registration, "REGISTER:report.txt:80").await,
        ResultCode::MalformedRequest
    );

    // The handler survived all of it.
    assert_eq!(
        send_registration(registration, "REGISTER:report.txt:7000").await,
        ResultCode::Ok
    );
    let client = DiscoveryClient::connect(lookup).await.unwrap();
    assert!(matches!(
        client.resolve(&ServiceName::from("report.txt")).await.unwrap(),
        LookupReply::Found(_)
    ));
}

#[tokio::test]
async fn test_lookup_of_unknown_name_is_a_negative_reply() {
    let (_, lookup) = spawn_server().await;
    let client = DiscoveryClient::connect(lookup).await.unwrap();

    assert_eq!(
        client
            .resolve(&ServiceName::from("nowhere.txt"))
            .await
            .unwrap(),
        LookupReply::NotFound
    );
}
