//! Application-level configuration constants.

use lapboard::BoardVariant;

// Deployment
pub const ACTIVE_VARIANT: BoardVariant = BoardVariant::TOP_TEN;

// Assets
pub const LOGO_SRC: &str = "/victory-sim.png"; // served from the dist root

// Operator prompts and placeholders
pub const RESET_PROMPT: &str = "Reset leaderboard and all drivers?";
pub const NAME_PLACEHOLDER: &str = "Driver name";
pub const LAP_HINT: &str = "Seconds (62.345) or M:SS.mmm (1:02.345)";
pub const EMPTY_BOARD_MESSAGE: &str = "No runs yet, start adding drivers.";
