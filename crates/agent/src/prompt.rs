use scoutbook_core::domain::recommendation::NarrativeContext;

/// Prompt for explaining a recommendation the rules have already made.
pub fn recommendation_prompt(context: &NarrativeContext) -> String {
    format!(
        "The rule-based scouting system has already recommended this player.\n\
         Explain, for a club analyst, why the player was recommended.\n\n\
         Team: {team}\n\
         Player: {player}\n\
         Position: {position}\n\
         Immediate score: {score:.2}\n\
         Potential score: {potential:.2}\n\
         System reason: {reason}\n\n\
         Rules:\n\
         - Explain the recommendation only.\n\
         - Do not suggest other players.\n\
         - Write 2-3 sentences of plain prose.",
        team = context.team_name,
        player = context.player_name,
        position = context.position,
        score = context.score,
        potential = context.potential_score,
        reason = context.rule_reason,
    )
}
