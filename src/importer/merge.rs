//! Turns search results into merge operations
//!
//! Each question record expands into node upserts followed by the edges that
//! hang off them. Records without an identity key are skipped individually.

use crate::neo4j::{AccountProps, AnswerProps, ContentRef, MergeBatch, QuestionProps, SiteLabel};
use crate::stackexchange::{AnswerItem, QuestionItem, ShallowUser};

/// Plan the merge batch for one page of results
pub fn plan_page(site: &SiteLabel, items: &[QuestionItem]) -> MergeBatch {
    let mut batch = MergeBatch::new(site.clone());
    for item in items {
        plan_question(&mut batch, item);
    }
    batch
}

/// Append the operations for one question record. Returns false if the
/// record has no `question_id` and was skipped.
pub fn plan_question(batch: &mut MergeBatch, item: &QuestionItem) -> bool {
    let Some(question_id) = item.question_id else {
        tracing::warn!(title = ?item.title, "Skipping question without question_id");
        return false;
    };

    batch.upsert_question(QuestionProps {
        id: question_id,
        title: item.title.clone(),
        url: item.share_link.clone(),
        created_at: item.creation_date,
        favorites: item.favorite_count,
        updated_at: item.last_activity_date,
        views: item.view_count,
        up_votes: item.up_vote_count,
        down_votes: item.down_vote_count,
    });

    if let Some(owner_id) = plan_owner(batch, item.owner.as_ref()) {
        batch.link_posted(owner_id, ContentRef::Question(question_id));
    }

    for tag in &item.tags {
        batch.upsert_tag(tag.as_str());
        batch.link_tagged(question_id, tag.as_str());
    }

    for answer in &item.answers {
        plan_answer(batch, question_id, answer);
    }

    true
}

fn plan_answer(batch: &mut MergeBatch, question_id: i64, answer: &AnswerItem) {
    let Some(answer_id) = answer.answer_id else {
        tracing::warn!(question_id, "Skipping answer without answer_id");
        return;
    };

    batch.upsert_answer(AnswerProps {
        id: answer_id,
        accepted: answer.is_accepted,
        up_votes: answer.up_vote_count,
        down_votes: answer.down_vote_count,
    });
    batch.link_answered(answer_id, question_id);

    if let Some(owner_id) = plan_owner(batch, answer.owner.as_ref()) {
        batch.link_posted(owner_id, ContentRef::Answer(answer_id));
    }
}

/// Upsert the owner's account if it has an id and return that id
fn plan_owner(batch: &mut MergeBatch, owner: Option<&ShallowUser>) -> Option<i64> {
    let owner = owner?;
    let user_id = owner.user_id?;
    batch.upsert_account(AccountProps {
        id: user_id,
        name: owner.display_name.clone(),
        reputation: owner.reputation,
        profile_image: owner.profile_image.clone(),
    });
    Some(user_id)
}
