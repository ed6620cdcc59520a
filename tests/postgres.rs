//! Repository tests against a live Postgres. Run with `DATABASE_URL` set and `--ignored`.

use sqlx::PgPool;
use time::{OffsetDateTime, macros::date};
use uuid::Uuid;

use clientbooks::application::repos::{
    ClienteParams, ClientesRepo, ClientesWriteRepo, CreateEspecialistaParams,
    CreateRequerimentoParams, EspecialistasRepo, PermissionsRepo, RepoError, RequerimentoFilter,
    RequerimentosRepo, RequerimentosWriteRepo, UpdateRequerimentoParams,
};
use clientbooks::domain::types::{
    ClienteStatus, PermissionLevel, RequerimentoStatus, TipoCobranca,
};
use clientbooks::infra::db::PostgresRepositories;

async fn insert_empresa(pool: &PgPool, nome: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO empresas_clientes (nome_completo, nome_abreviado) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("{nome} S.A."))
    .bind(nome)
    .fetch_one(pool)
    .await
    .expect("insert empresa")
}

fn requerimento(cliente_id: Uuid, chamado: &str, mes: &str) -> CreateRequerimentoParams {
    CreateRequerimentoParams {
        chamado: chamado.to_string(),
        cliente_id,
        modulo: "Comply".into(),
        descricao: "Ajuste".into(),
        data_envio: date!(2024 - 05 - 02),
        data_aprovacao: Some(date!(2024 - 05 - 10)),
        horas_funcional: 2.0,
        horas_tecnico: 1.0,
        linguagem: "ABAP".into(),
        tipo_cobranca: TipoCobranca::BolsaoEnel,
        mes_cobranca: Some(mes.to_string()),
        observacao: None,
    }
}

fn cliente(empresa_id: Uuid, email: &str) -> ClienteParams {
    ClienteParams {
        nome_completo: "Ana Souza".into(),
        email: email.into(),
        funcao: None,
        empresa_id,
        status: ClienteStatus::Ativo,
        descricao_status: None,
        principal_contato: false,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn requerimentos_round_trip_through_billing(pool: PgPool) {
    let empresa = insert_empresa(&pool, "ACME").await;
    let repos = PostgresRepositories::new(pool);

    let maio = repos
        .create_requerimento(requerimento(empresa, "RF-1", "05/2024"))
        .await
        .expect("create");
    let junho = repos
        .create_requerimento(requerimento(empresa, "RF-2", "06/2024"))
        .await
        .expect("create");
    assert_eq!(maio.status, RequerimentoStatus::Lancado);
    assert_eq!(maio.tipo_cobranca, TipoCobranca::BolsaoEnel);

    let filter = RequerimentoFilter {
        mes_cobranca: Some("05/2024".into()),
        ..RequerimentoFilter::default()
    };
    let listed = repos.list_requerimentos(&filter).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, maio.id);

    let now = OffsetDateTime::now_utc();
    let enviado = repos
        .mark_enviado_faturamento(maio.id, now)
        .await
        .expect("send");
    assert!(enviado.enviado_faturamento);

    let faturados = repos
        .mark_faturados(&[maio.id, junho.id], now)
        .await
        .expect("bill");
    assert_eq!(faturados.len(), 1);
    assert_eq!(faturados[0].status, RequerimentoStatus::Faturado);

    let reset = repos.reset_to_lancado(maio.id).await.expect("reset");
    assert_eq!(reset.status, RequerimentoStatus::Lancado);
    assert!(reset.data_faturamento.is_none());
    assert!(!reset.enviado_faturamento);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn lifecycle_writes_refuse_requerimentos_in_the_wrong_state(pool: PgPool) {
    let empresa = insert_empresa(&pool, "ACME").await;
    let repos = PostgresRepositories::new(pool);
    let record = repos
        .create_requerimento(requerimento(empresa, "RF-9", "05/2024"))
        .await
        .expect("create");
    let sent = repos
        .mark_enviado_faturamento(record.id, OffsetDateTime::now_utc())
        .await
        .expect("send");

    let resend = repos
        .mark_enviado_faturamento(record.id, OffsetDateTime::now_utc())
        .await
        .unwrap_err();
    assert!(matches!(resend, RepoError::NotFound));
    let edit = repos
        .update_requerimento(UpdateRequerimentoParams {
            id: record.id,
            fields: requerimento(empresa, "RF-9", "06/2024"),
        })
        .await
        .unwrap_err();
    assert!(matches!(edit, RepoError::NotFound));
    let delete = repos.delete_requerimento(record.id).await.unwrap_err();
    assert!(matches!(delete, RepoError::NotFound));

    let stored = repos
        .find_requerimento(record.id)
        .await
        .expect("find")
        .expect("record kept");
    assert_eq!(stored.data_envio_faturamento, sent.data_envio_faturamento);
    assert_eq!(stored.mes_cobranca.as_deref(), Some("05/2024"));

    repos.reset_to_lancado(record.id).await.expect("reset");
    let reset_again = repos.reset_to_lancado(record.id).await.unwrap_err();
    assert!(matches!(reset_again, RepoError::NotFound));
    repos.delete_requerimento(record.id).await.expect("delete once back in lancado");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_company_surfaces_the_foreign_key(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let err = repos
        .create_requerimento(requerimento(Uuid::new_v4(), "RF-1", "05/2024"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ForeignKey { ref constraint } if constraint == "requerimentos_cliente_id_fkey"
    ));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn cliente_email_is_unique_per_company_ignoring_case(pool: PgPool) {
    let acme = insert_empresa(&pool, "ACME").await;
    let globex = insert_empresa(&pool, "Globex").await;
    let repos = PostgresRepositories::new(pool);

    repos
        .create_cliente(cliente(acme, "ana@acme.com"))
        .await
        .expect("create");
    let err = repos
        .create_cliente(cliente(acme, "ANA@acme.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { .. }));

    repos
        .create_cliente(cliente(globex, "ana@acme.com"))
        .await
        .expect("other company");

    let found = repos
        .find_cliente_by_email(acme, " Ana@ACME.com ")
        .await
        .expect("lookup");
    assert!(found.is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn permissions_resolve_through_group(pool: PgPool) {
    let group: Uuid = sqlx::query_scalar("INSERT INTO user_groups (name) VALUES ('financeiro') RETURNING id")
        .fetch_one(&pool)
        .await
        .expect("group");
    let user = Uuid::new_v4();
    sqlx::query("INSERT INTO user_group_assignments (user_id, group_id) VALUES ($1, $2)")
        .bind(user)
        .bind(group)
        .execute(&pool)
        .await
        .expect("assignment");
    sqlx::query(
        "INSERT INTO screen_permissions (group_id, screen_key, permission_level) VALUES ($1, 'faturamento', 'edit')",
    )
    .bind(group)
    .execute(&pool)
    .await
    .expect("grant");

    let repos = PostgresRepositories::new(pool);
    let assignment = repos.find_user_group(user).await.expect("group lookup");
    assert_eq!(assignment.and_then(|record| record.group_id), Some(group));
    assert!(repos.screen_exists("faturamento").await.expect("screen"));
    assert!(!repos.screen_exists("inexistente").await.expect("screen"));
    assert_eq!(
        repos
            .find_screen_permission(group, "faturamento")
            .await
            .expect("permission"),
        Some(PermissionLevel::Edit)
    );
    assert_eq!(
        repos
            .find_screen_permission(group, "clientes")
            .await
            .expect("permission"),
        None
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn deactivated_especialistas_leave_the_active_list(pool: PgPool) {
    let repos = PostgresRepositories::new(pool);
    let carla = repos
        .create_especialista(CreateEspecialistaParams {
            nome: "Carla".into(),
            email: None,
        })
        .await
        .expect("create");

    assert_eq!(repos.list_active_especialistas().await.expect("list").len(), 1);
    repos
        .deactivate_especialista(carla.id)
        .await
        .expect("deactivate");
    assert!(repos.list_active_especialistas().await.expect("list").is_empty());

    let err = repos.deactivate_especialista(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}
