//! Integration tests for the contract lifecycle repositories.
//!
//! Each test receives its own freshly-migrated database from `#[sqlx::test]`.
//! These cover the transitions that only make sense against real rows:
//! sharing, invitation handling, amendment application, and the activation
//! check behind the confirmation gate.

use accord_core::amendment::{AmendmentKind, AmendmentProposal};
use accord_core::contract::{method, status};
use accord_core::error::CoreError;
use accord_core::flow::ConsentFlowState;
use accord_db::models::contract::{ArtifactRefs, CreateContract, SharedParty};
use accord_db::repositories::{CollaboratorRepo, ContractRepo, InvitationRepo};
use accord_db::DbError;
use chrono::{Duration, Utc};
use sqlx::PgPool;

async fn create_user(pool: &PgPool, username: &str, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (username, email, display_name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("user insert should succeed")
}

/// A flow complete enough to share: encounter type, method, two parties.
fn shareable_flow() -> ConsentFlowState {
    let mut flow = ConsentFlowState::new();
    flow.encounter_type = Some("date".to_string());
    flow.method = Some(method::SIGNATURE.to_string());
    flow.add_partner("@ada_l").expect("valid partner");
    flow.add_partner("@grace_h").expect("valid partner");
    flow
}

fn by_email(email: &str) -> Vec<SharedParty> {
    vec![SharedParty {
        user_id: None,
        email: Some(email.to_string()),
    }]
}

async fn create_collaborative_contract(
    pool: &PgPool,
    initiator: i64,
    flow: ConsentFlowState,
) -> accord_db::models::contract::Contract {
    let input = CreateContract {
        flow,
        is_collaborative: true,
        artifacts: ArtifactRefs::default(),
    };
    ContractRepo::create(pool, initiator, &input)
        .await
        .expect("contract creation should succeed")
}

// ---------------------------------------------------------------------------
// Confirmation gate vs. outstanding invitations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_pending_invitation_blocks_activation(pool: PgPool) {
    let initiator = create_user(&pool, "ada", "ada@example.com").await;
    let contract = create_collaborative_contract(&pool, initiator, shareable_flow()).await;

    let outcome = ContractRepo::share(
        &pool,
        contract.id,
        initiator,
        &by_email("grace@example.com"),
    )
    .await
    .expect("share should succeed");
    assert_eq!(outcome.invitations.len(), 1);

    // The initiator is the only collaborator row so far. Their confirmation
    // must not activate the contract while the invited party has yet to
    // accept.
    let confirm = CollaboratorRepo::confirm(&pool, contract.id, initiator)
        .await
        .expect("initiator confirm should succeed");
    assert!(!confirm.all_parties_confirmed);

    let reloaded = ContractRepo::find_by_id(&pool, contract.id)
        .await
        .expect("lookup should succeed")
        .expect("contract exists");
    assert_eq!(reloaded.status, status::PENDING_APPROVAL);

    // The invited party can still accept the live invitation, confirm, and
    // only then does the contract activate.
    let guest = create_user(&pool, "grace", "grace@example.com").await;
    InvitationRepo::accept(&pool, &outcome.invitations[0].code, guest)
        .await
        .expect("invited party must be able to accept");

    let confirm = CollaboratorRepo::confirm(&pool, contract.id, guest)
        .await
        .expect("guest confirm should succeed");
    assert!(confirm.all_parties_confirmed);

    let reloaded = ContractRepo::find_by_id(&pool, contract.id)
        .await
        .expect("lookup should succeed")
        .expect("contract exists");
    assert_eq!(reloaded.status, status::ACTIVE);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_invitation_does_not_block_activation(pool: PgPool) {
    let initiator = create_user(&pool, "ada", "ada@example.com").await;
    let contract = create_collaborative_contract(&pool, initiator, shareable_flow()).await;

    let outcome = ContractRepo::share(
        &pool,
        contract.id,
        initiator,
        &by_email("grace@example.com"),
    )
    .await
    .expect("share should succeed");

    // Backdate the invitation past its TTL; the sweep has not run yet, so
    // its status is still 'pending'.
    sqlx::query("UPDATE invitations SET expires_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(outcome.invitations[0].id)
        .execute(&pool)
        .await
        .expect("backdate should succeed");

    let confirm = CollaboratorRepo::confirm(&pool, contract.id, initiator)
        .await
        .expect("initiator confirm should succeed");
    assert!(confirm.all_parties_confirmed);

    let reloaded = ContractRepo::find_by_id(&pool, contract.id)
        .await
        .expect("lookup should succeed")
        .expect("contract exists");
    assert_eq!(reloaded.status, status::ACTIVE);
}

// ---------------------------------------------------------------------------
// Re-sharing with the same external party
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reshare_same_email_reuses_invitation(pool: PgPool) {
    let initiator = create_user(&pool, "ada", "ada@example.com").await;
    let contract = create_collaborative_contract(&pool, initiator, shareable_flow()).await;

    let first = ContractRepo::share(
        &pool,
        contract.id,
        initiator,
        &by_email("grace@example.com"),
    )
    .await
    .expect("first share should succeed");

    // Same party, different case: the original code stays the only live one.
    let second = ContractRepo::share(
        &pool,
        contract.id,
        initiator,
        &by_email("Grace@Example.com"),
    )
    .await
    .expect("second share should succeed");

    assert_eq!(second.invitations[0].id, first.invitations[0].id);
    assert_eq!(second.invitations[0].code, first.invitations[0].code);

    let all = InvitationRepo::list_for_contract(&pool, contract.id)
        .await
        .expect("listing should succeed");
    assert_eq!(all.len(), 1);
}

// ---------------------------------------------------------------------------
// Amendment duration handling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_shorten_amendment_keeps_duration_positive(pool: PgPool) {
    let initiator = create_user(&pool, "ada", "ada@example.com").await;
    let partner = create_user(&pool, "grace", "grace@example.com").await;

    let mut flow = shareable_flow();
    flow.start_time = Some(Utc::now());
    flow.duration_minutes = Some(120);
    let contract = create_collaborative_contract(&pool, initiator, flow).await;

    ContractRepo::share(
        &pool,
        contract.id,
        initiator,
        &[SharedParty {
            user_id: Some(partner),
            email: None,
        }],
    )
    .await
    .expect("share should succeed");

    let start = contract.start_time.expect("fixture has a schedule");

    // A sub-minute remainder is refused up front rather than tripping the
    // duration constraint at write time.
    let proposal = AmendmentProposal {
        kind: AmendmentKind::ShortenDuration {
            new_end_time: start + Duration::seconds(30),
        },
        reason: "ending early".to_string(),
    };
    let err = ContractRepo::apply_amendment(&pool, contract.id, initiator, &proposal, Utc::now())
        .await
        .expect_err("sub-minute duration must be rejected");
    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

    // A whole-minute reduction applies and recomputes the stored duration.
    let proposal = AmendmentProposal {
        kind: AmendmentKind::ShortenDuration {
            new_end_time: start + Duration::minutes(90),
        },
        reason: "ending early".to_string(),
    };
    let updated = ContractRepo::apply_amendment(&pool, contract.id, initiator, &proposal, Utc::now())
        .await
        .expect("whole-minute reduction should apply");
    assert_eq!(updated.duration_minutes, Some(90));
    assert_eq!(updated.status, status::PENDING_APPROVAL);
}
