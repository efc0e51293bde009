mod common;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;

use common::{json_body, location, TestApp};
use invoice_dashboard::handlers::protected::invoices::list_key;
use invoice_dashboard::types::Operation;
use invoice_dashboard::validation::{AMOUNT_ERROR, CUSTOMER_ERROR, STATUS_ERROR};

const LIST: &str = "/dashboard/invoices";

#[tokio::test]
async fn create_stores_cents_and_redirects_to_the_list() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();

    let res = app
        .post_form(
            LIST,
            &[("customerId", customer.as_str()), ("amount", "12.50"), ("status", "pending")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(LIST));
    assert_eq!(app.store.statements(), vec![Operation::Create]);

    let created: Vec<_> = app.store.invoices().into_iter().filter(|i| i.amount == 1250).collect();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].customer_id, app.lee);
    assert_eq!(created[0].status, "pending");
    Ok(())
}

#[tokio::test]
async fn create_revalidates_the_invoice_list() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();

    let before = json_body(app.get(LIST, true).await?).await?;
    assert_eq!(before["data"]["invoices"].as_array().map(Vec::len), Some(3));
    assert!(app.state.cache.get(&list_key("", 1)).await.is_some());

    app.post_form(
        LIST,
        &[("customerId", customer.as_str()), ("amount", "99"), ("status", "paid")],
        true,
    )
    .await?;
    assert!(app.state.cache.get(&list_key("", 1)).await.is_none());

    let after = json_body(app.get(LIST, true).await?).await?;
    assert_eq!(after["data"]["invoices"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[tokio::test]
async fn non_positive_amount_is_rejected_without_a_statement() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();

    for amount in ["0", "-5", "0.001"] {
        let res = app
            .post_form(
                LIST,
                &[("customerId", customer.as_str()), ("amount", amount), ("status", "paid")],
                true,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "amount {amount}");
        let body = json_body(res).await?;
        assert_eq!(body["data"]["state"], "invalid");
        assert_eq!(body["data"]["errors"]["amount"][0], AMOUNT_ERROR);
        assert_eq!(body["data"]["message"], "Missing Fields. Failed to Create Invoice.");
    }

    assert!(app.store.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_status_is_rejected_without_a_statement() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();

    let res = app
        .post_form(
            LIST,
            &[("customerId", customer.as_str()), ("amount", "10"), ("status", "overdue")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["errors"]["status"][0], STATUS_ERROR);
    assert!(body["data"]["errors"].get("amount").is_none());
    assert!(app.store.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_form_reports_every_field() -> Result<()> {
    let app = TestApp::new();

    let res = app.post_form(LIST, &[], true).await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["errors"]["customerId"][0], CUSTOMER_ERROR);
    assert_eq!(body["data"]["errors"]["amount"][0], AMOUNT_ERROR);
    assert_eq!(body["data"]["errors"]["status"][0], STATUS_ERROR);
    Ok(())
}

#[tokio::test]
async fn database_failure_on_create_is_a_message_not_a_redirect() -> Result<()> {
    let app = TestApp::new();
    let unknown_customer = Uuid::new_v4().to_string();

    app.get(LIST, true).await?;
    let res = app
        .post_form(
            LIST,
            &[("customerId", unknown_customer.as_str()), ("amount", "10"), ("status", "paid")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(location(&res).is_none());
    let body = json_body(res).await?;
    assert_eq!(body["data"]["state"], "failed");
    assert_eq!(body["data"]["message"], "Database Error: Failed to Create Invoice.");

    // nothing changed, so the cached list stays
    assert!(app.state.cache.get(&list_key("", 1)).await.is_some());
    Ok(())
}

#[tokio::test]
async fn update_rewrites_the_invoice() -> Result<()> {
    let app = TestApp::new();
    let customer = app.evil_rabbit.to_string();
    let path = format!("{}/{}", LIST, app.paid_invoice);

    let res = app
        .post_form(
            &path,
            &[("customerId", customer.as_str()), ("amount", "19.999"), ("status", "pending")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(LIST));
    assert_eq!(app.store.statements(), vec![Operation::Update]);

    let invoice = app.store.invoice(app.paid_invoice).expect("invoice still exists");
    assert_eq!(invoice.amount, 2000);
    assert_eq!(invoice.status, "pending");
    assert_eq!(invoice.customer_id, app.evil_rabbit);
    Ok(())
}

#[tokio::test]
async fn update_revalidates_the_invoice_list() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();
    let path = format!("{}/{}", LIST, app.pending_invoice);

    app.get(LIST, true).await?;
    app.get("/dashboard/invoices?query=rabbit", true).await?;
    assert!(app.state.cache.get(&list_key("", 1)).await.is_some());

    let res = app
        .post_form(
            &path,
            &[("customerId", customer.as_str()), ("amount", "5"), ("status", "paid")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(app.state.cache.get(&list_key("", 1)).await.is_none());
    assert!(app.state.cache.get(&list_key("rabbit", 1)).await.is_none());

    let body = json_body(app.get("/dashboard/invoices?query=rabbit", true).await?).await?;
    assert_eq!(body["data"]["invoices"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn database_failure_on_update_is_a_message_not_a_redirect() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();
    let path = format!("{}/{}", LIST, app.pending_invoice);

    app.get(LIST, true).await?;
    app.store.set_unavailable(true);

    let res = app
        .post_form(
            &path,
            &[("customerId", customer.as_str()), ("amount", "5"), ("status", "paid")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(location(&res).is_none());
    let body = json_body(res).await?;
    assert_eq!(body["data"]["state"], "failed");
    assert_eq!(body["data"]["message"], "Database Error: Failed to Update Invoice.");
    assert_eq!(app.store.statements(), vec![Operation::Update]);

    // nothing changed, so the cached list stays
    assert!(app.state.cache.get(&list_key("", 1)).await.is_some());
    Ok(())
}

#[tokio::test]
async fn invalid_update_names_the_update() -> Result<()> {
    let app = TestApp::new();
    let customer = app.lee.to_string();
    let path = format!("{}/{}", LIST, app.paid_invoice);

    let res = app
        .post_form(
            &path,
            &[("customerId", customer.as_str()), ("amount", "abc"), ("status", "paid")],
            true,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["message"], "Missing Fields. Failed to Update Invoice.");
    assert_eq!(body["data"]["errors"]["amount"][0], AMOUNT_ERROR);
    assert!(app.store.statements().is_empty());
    assert_eq!(app.store.invoice(app.paid_invoice).map(|i| i.amount), Some(15_795));
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_invoice() -> Result<()> {
    let app = TestApp::new();

    let res = app.delete(&format!("{}/{}", LIST, app.pending_invoice)).await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["message"], "Deleted Invoice.");
    assert!(app.store.invoice(app.pending_invoice).is_none());
    Ok(())
}

#[tokio::test]
async fn delete_of_missing_invoice_still_reports_success() -> Result<()> {
    let app = TestApp::new();
    let missing = Uuid::new_v4();

    let res = app
        .post_form(&format!("{}/{}/delete", LIST, missing), &[], true)
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["message"], "Deleted Invoice.");
    assert_eq!(app.store.statements(), vec![Operation::Delete]);
    assert_eq!(app.store.invoices().len(), 3);

    let res = app.delete(&format!("{}/not-a-uuid", LIST)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn database_failure_on_delete_is_reported() -> Result<()> {
    let app = TestApp::new();
    app.store.set_unavailable(true);

    let res = app.delete(&format!("{}/{}", LIST, app.paid_invoice)).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(res).await?;
    assert_eq!(body["data"]["message"], "Database Error: Failed to Delete Invoice.");
    Ok(())
}
