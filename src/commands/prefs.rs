//! Commands for onboarding preferences and app gates.

use tracing::info;

use super::AppContext;
use crate::error::Result;
use crate::history::AnalysisRepository;
use crate::prefs::{AppState, PrefsUpdate};

pub async fn get_app_state(ctx: &AppContext) -> Result<AppState> {
    Ok(ctx.prefs.app_state())
}

pub async fn set_prefs(ctx: &AppContext, update: PrefsUpdate) -> Result<AppState> {
    let state = ctx.prefs.set_prefs(update)?;
    info!(
        "Updated preferences: concern={:?}, budget={:?}",
        state.user_prefs.main_concern, state.user_prefs.budget
    );
    Ok(state)
}

pub async fn complete_onboarding(ctx: &AppContext) -> Result<AppState> {
    ctx.prefs.set_seen_onboarding(true)
}

pub async fn set_purchased(ctx: &AppContext, purchased: bool) -> Result<AppState> {
    ctx.prefs.set_purchased(purchased)
}

/// Forget everything for the current user: preferences, gates, history and
/// the analyses it references.
pub async fn reset(ctx: &AppContext) -> Result<()> {
    let removed = ctx.history.history(ctx.user_id())?.len();
    ctx.history.clear_user(ctx.user_id())?;
    ctx.prefs.clear()?;
    info!("Reset local data for {} ({} analyses)", ctx.user_id(), removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisResult;
    use crate::commands::test_support::create_test_context;
    use crate::history::StoredAnalysis;
    use crate::prefs::{BudgetTier, PainPoint};

    #[tokio::test]
    async fn test_onboarding_flow() {
        let (ctx, _dir) = create_test_context();
        let state = get_app_state(&ctx).await.unwrap();
        assert!(!state.has_seen_onboarding);

        set_prefs(
            &ctx,
            PrefsUpdate {
                main_concern: Some(PainPoint::Hormonal),
                budget: Some(BudgetTier::Under50),
            },
        )
        .await
        .unwrap();
        complete_onboarding(&ctx).await.unwrap();

        let state = get_app_state(&ctx).await.unwrap();
        assert!(state.has_seen_onboarding);
        assert!(!state.has_purchased);
        assert_eq!(state.user_prefs.main_concern, Some(PainPoint::Hormonal));
    }

    #[tokio::test]
    async fn test_reset_clears_prefs_and_history() {
        let (ctx, _dir) = create_test_context();
        set_purchased(&ctx, true).await.unwrap();
        let analysis = StoredAnalysis::new("file:///face.jpg", AnalysisResult::default());
        ctx.history.record_completed(ctx.user_id(), &analysis).unwrap();

        reset(&ctx).await.unwrap();

        assert_eq!(get_app_state(&ctx).await.unwrap(), AppState::default());
        assert!(ctx.history.history(ctx.user_id()).unwrap().is_empty());
        assert!(ctx.history.get(&analysis.id).unwrap().is_none());
    }
}
