use super::{success, ApiResult};
use crate::models::Vocabulary;

/// GET /api/vocabulary - Cities, cause areas and skills for form pickers.
pub async fn get_vocabulary() -> ApiResult<Vocabulary> {
    success(Vocabulary::current())
}
