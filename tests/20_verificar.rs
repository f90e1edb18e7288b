mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn assert_denied(body: Value) {
    assert_eq!(body["autorizado"], false);
    assert_eq!(body["status"], 205);
    assert!(body["message"].as_str().unwrap().starts_with("❌ Acesso negado!"));
    assert!(body.get("tecnico").is_none());
}

#[tokio::test]
async fn active_technician_is_authorized() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.login().await?;
    server
        .create_technician(&token, json!({ "nome": "Ana", "telefone": "11999990000" }))
        .await?;

    let res = server.client.get(server.api("/verificar-tecnico/11999990000")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["autorizado"], true);
    assert_eq!(body["tecnico"], json!({ "nome": "Ana", "telefone": "11999990000" }));
    assert_eq!(body["status"], 200);
    assert!(body["message"].as_str().unwrap().contains("Ana"));
    Ok(())
}

#[tokio::test]
async fn unknown_phone_is_denied_with_205() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.api("/verificar-tecnico/11000000000")).send().await?;
    assert_eq!(res.status(), StatusCode::RESET_CONTENT);
    assert_denied(res.json().await?);
    Ok(())
}

#[tokio::test]
async fn inactive_technician_is_denied() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let token = server.login().await?;
    server
        .create_technician(&token, json!({ "nome": "Bia", "telefone": "11888880000", "ativo": false }))
        .await?;

    let res = server.client.get(server.api("/verificar-tecnico/11888880000")).send().await?;
    assert_eq!(res.status(), StatusCode::RESET_CONTENT);
    assert_denied(res.json().await?);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_not_a_denial() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.store.set_failing(true);

    let res = server.client.get(server.api("/verificar-tecnico/11999990000")).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Erro interno do servidor");
    assert_eq!(body["status"], 500);
    assert!(body.get("autorizado").is_none());
    Ok(())
}
