mod support;

use serde_json::{Value, json};
use uuid::Uuid;

use clientbooks::domain::types::{EmpresaStatus, PermissionLevel};
use support::{TestApp, build_app};

fn requerimento_body(cliente_id: Uuid, chamado: &str, tipo: &str) -> Value {
    json!({
        "chamado": chamado,
        "cliente_id": cliente_id,
        "modulo": "Comply",
        "descricao": "Ajuste no layout da nota fiscal",
        "data_envio": "2024-05-02",
        "data_aprovacao": "2024-05-10",
        "horas_funcional": "2,5",
        "horas_tecnico": 1.5,
        "linguagem": "ABAP",
        "tipo_cobranca": tipo,
        "mes_cobranca": 5
    })
}

async fn app_with_editor() -> (TestApp, Uuid, Uuid) {
    let app = build_app();
    let empresa = app.store.add_empresa("ACME", EmpresaStatus::Ativo).await;
    let user = app.store.add_user(PermissionLevel::Edit).await;
    (app, empresa, user)
}

#[tokio::test]
async fn health_reports_store_state() {
    let app = build_app();
    let (status, _) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, 204);

    app.store
        .healthy
        .store(false, std::sync::atomic::Ordering::SeqCst);
    let (status, _) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, 503);
}

#[tokio::test]
async fn missing_or_malformed_caller_is_unauthorized() {
    let app = build_app();

    let (status, body) = app.send("GET", "/api/v1/requerimentos", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let request = axum::http::Request::builder()
        .uri("/api/v1/requerimentos")
        .header(clientbooks::infra::http::USER_ID_HEADER, "not-a-uuid")
        .body(axum::body::Body::empty())
        .expect("request");
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .expect("response");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn screen_permissions_gate_every_route() {
    let app = build_app();
    let empresa = app.store.add_empresa("ACME", EmpresaStatus::Ativo).await;

    let stranger = Uuid::new_v4();
    let (status, body) = app
        .send("GET", "/api/v1/requerimentos", Some(stranger), None)
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], "PERMISSION_DENIED");

    let viewer = app.store.add_user(PermissionLevel::View).await;
    let (status, _) = app
        .send("GET", "/api/v1/requerimentos", Some(viewer), None)
        .await;
    assert_eq!(status, 200);

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(viewer),
            Some(requerimento_body(empresa, "RF-1", "Faturado")),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(body["error"]["code"], "PERMISSION_DENIED");
    assert!(app.store.requerimentos.lock().await.is_empty());
}

#[tokio::test]
async fn invalid_form_reports_every_violation() {
    let (app, _empresa, user) = app_with_editor().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(user),
            Some(json!({ "chamado": "RF 1", "horas_funcional": "abc" })),
        )
        .await;

    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "CLIENTE_REQUIRED");
    let codes: Vec<&str> = body["violations"]
        .as_array()
        .expect("violations")
        .iter()
        .filter_map(|violation| violation["code"].as_str())
        .collect();
    assert!(codes.contains(&"MODULO_REQUIRED"));
    assert!(codes.contains(&"CHAMADO_INVALID_FORMAT"));
    assert!(codes.contains(&"HORAS_INVALID"));
    assert!(!codes.contains(&"CHAMADO_REQUIRED"));
}

#[tokio::test]
async fn unknown_company_is_not_found() {
    let (app, _empresa, user) = app_with_editor().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(user),
            Some(requerimento_body(Uuid::new_v4(), "RF-2", "Faturado")),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "CLIENTE_NOT_FOUND");
}

#[tokio::test]
async fn requirement_lifecycle_through_billing() {
    let (app, empresa, user) = app_with_editor().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(user),
            Some(requerimento_body(empresa, "RF-100", "Faturado")),
        )
        .await;
    assert_eq!(status, 201);
    let requerimento = &body["requerimento"];
    assert_eq!(requerimento["status"], "lancado");
    assert_eq!(requerimento["mes_cobranca"], "05/2024");
    assert_eq!(requerimento["horas_funcional"], 2.5);
    assert!(body.get("banco_de_horas").is_none());
    let id = requerimento["id"].as_str().expect("id").to_string();

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/requerimentos/{id}/enviar"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "enviado_faturamento");
    assert_eq!(body["enviado_faturamento"], true);

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/requerimentos/{id}/enviar"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "REQUERIMENTO_ALREADY_SENT");

    let (status, body) = app
        .send(
            "GET",
            "/api/v1/faturamento/resumo?mes=05/2024",
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["total_requerimentos"], 1);
    assert_eq!(body["total_horas"], 4.0);
    assert_eq!(body["grupos"].as_array().map(Vec::len), Some(8));

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos/faturar",
            Some(user),
            Some(json!({ "ids": [id] })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["status"], "faturado");

    let (status, body) = app
        .send(
            "GET",
            "/api/v1/requerimentos?status=faturado",
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn rejected_requirement_books_analysis_hours() {
    let (app, empresa, user) = app_with_editor().await;

    let mut body = requerimento_body(empresa, "RF-200", "Reprovado");
    body["horas_analise_ef"] = json!("3");

    let (status, body) = app
        .send("POST", "/api/v1/requerimentos", Some(user), Some(body))
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["requerimento"]["tipo_cobranca"], "Reprovado");
    assert_eq!(body["banco_de_horas"]["tipo_cobranca"], "Banco de Horas");
    assert_eq!(body["banco_de_horas"]["horas_funcional"], 3.0);
    assert_eq!(body["banco_de_horas"]["chamado"], "RF-200");
    assert_eq!(app.store.requerimentos.lock().await.len(), 2);
}

#[tokio::test]
async fn batch_send_reports_each_failure() {
    let (app, empresa, user) = app_with_editor().await;

    let (_, created) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(user),
            Some(requerimento_body(empresa, "RF-300", "Contrato")),
        )
        .await;
    let id = created["requerimento"]["id"].clone();
    let missing = Uuid::new_v4();

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/requerimentos/enviar-lote",
            Some(user),
            Some(json!({ "ids": [id, missing] })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["enviados"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["falhas"][0]["id"], missing.to_string());
    assert_eq!(body["falhas"][0]["code"], "REQUERIMENTO_NOT_FOUND");
}

#[tokio::test]
async fn billing_email_is_dispatched_to_the_sender() {
    let (app, empresa, user) = app_with_editor().await;

    let (_, created) = app
        .send(
            "POST",
            "/api/v1/requerimentos",
            Some(user),
            Some(requerimento_body(empresa, "RF-400", "Hora Extra")),
        )
        .await;
    let id = created["requerimento"]["id"].as_str().expect("id").to_string();
    app.send(
        "POST",
        &format!("/api/v1/requerimentos/{id}/enviar"),
        Some(user),
        None,
    )
    .await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/faturamento/disparos",
            Some(user),
            Some(json!({
                "mes_cobranca": "05/2024",
                "destinatarios": ["financeiro@acme.com"],
                "copia": ["gestor@acme.com"]
            })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["requerimentos"], 1);

    let sent = app.sender.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["financeiro@acme.com".to_string()]);
    assert_eq!(sent[0].cc, vec!["gestor@acme.com".to_string()]);
    assert!(sent[0].html.contains("RF-400"));
}

#[tokio::test]
async fn billing_email_rejects_bad_recipients() {
    let (app, _empresa, user) = app_with_editor().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/faturamento/disparos",
            Some(user),
            Some(json!({
                "mes_cobranca": "05/2024",
                "destinatarios": ["financeiro@acme.com", "sem-arroba"]
            })),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "FATURAMENTO_DESTINATARIOS_INVALID");
    assert!(app.sender.sent.lock().await.is_empty());
}

#[tokio::test]
async fn contacts_enforce_unique_email_and_single_primary() {
    let (app, empresa, user) = app_with_editor().await;

    let (status, first) = app
        .send(
            "POST",
            "/api/v1/clientes",
            Some(user),
            Some(json!({
                "nome_completo": "Ana Souza",
                "email": "ana@acme.com",
                "empresa_id": empresa,
                "principal_contato": true
            })),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(first["principal_contato"], true);

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/clientes",
            Some(user),
            Some(json!({
                "nome_completo": "Ana S.",
                "email": " ANA@acme.com ",
                "empresa_id": empresa
            })),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CLIENTE_EMAIL_DUPLICADO");

    let (status, second) = app
        .send(
            "POST",
            "/api/v1/clientes",
            Some(user),
            Some(json!({
                "nome_completo": "Bruno Lima",
                "email": "bruno@acme.com",
                "empresa_id": empresa,
                "principal_contato": true
            })),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(second["principal_contato"], true);

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/v1/empresas/{empresa}/clientes"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 200);
    let principais: Vec<&str> = body
        .as_array()
        .expect("clientes")
        .iter()
        .filter(|cliente| cliente["principal_contato"] == true)
        .filter_map(|cliente| cliente["email"].as_str())
        .collect();
    assert_eq!(principais, vec!["bruno@acme.com"]);
}

#[tokio::test]
async fn inactivating_a_contact_requires_a_reason() {
    let (app, empresa, user) = app_with_editor().await;

    let (_, cliente) = app
        .send(
            "POST",
            "/api/v1/clientes",
            Some(user),
            Some(json!({
                "nome_completo": "Carla Dias",
                "email": "carla@acme.com",
                "empresa_id": empresa
            })),
        )
        .await;
    let id = cliente["id"].as_str().expect("id").to_string();

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/clientes/{id}/status"),
            Some(user),
            Some(json!({ "status": "inativo", "descricao_status": "  " })),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], "CLIENTE_DESCRICAO_STATUS_REQUIRED");

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/clientes/{id}/status"),
            Some(user),
            Some(json!({ "status": "inativo", "descricao_status": "Saiu da empresa" })),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "inativo");
}

#[tokio::test]
async fn contact_with_dispatch_history_cannot_be_deleted() {
    let (app, empresa, user) = app_with_editor().await;

    let (_, cliente) = app
        .send(
            "POST",
            "/api/v1/clientes",
            Some(user),
            Some(json!({
                "nome_completo": "Diego Reis",
                "email": "diego@acme.com",
                "empresa_id": empresa
            })),
        )
        .await;
    let id: Uuid = cliente["id"].as_str().expect("id").parse().expect("uuid");
    app.store.disparos.lock().await.insert(id, 2);

    let (status, body) = app
        .send("DELETE", &format!("/api/v1/clientes/{id}"), Some(user), None)
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CLIENTE_HAS_HISTORY");

    app.store.disparos.lock().await.remove(&id);
    let (status, _) = app
        .send("DELETE", &format!("/api/v1/clientes/{id}"), Some(user), None)
        .await;
    assert_eq!(status, 204);
}

#[tokio::test]
async fn specialists_follow_their_own_screen_grant() {
    let app = build_app();
    let user = app.store.add_user(PermissionLevel::View).await;
    app.store
        .grant(user, "especialistas", PermissionLevel::Edit)
        .await;

    let (status, created) = app
        .send(
            "POST",
            "/api/v1/especialistas",
            Some(user),
            Some(json!({ "nome": "Elisa Prado", "email": "elisa@books.com" })),
        )
        .await;
    assert_eq!(status, 201);

    let (status, body) = app
        .send("GET", "/api/v1/especialistas", Some(user), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(body[0]["nome"], "Elisa Prado");

    let id = created["id"].as_str().expect("id");
    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/v1/especialistas/{id}"),
            Some(user),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["ativo"], false);

    let (_, body) = app
        .send("GET", "/api/v1/especialistas", Some(user), None)
        .await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}
