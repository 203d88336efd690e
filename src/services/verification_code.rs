use rand::Rng;

/// Validity window of a verification code
pub const CODE_TTL_SECONDS: i64 = 5 * 60;

/// Generates short numeric one-time codes for the second login factor
///
/// The 6-digit space is not guess-proof by itself; the short validity window,
/// hashing at rest and the resend cooldown bound the exposure.
pub struct VerificationCodeGenerator;

impl VerificationCodeGenerator {
    /// Generate a 6-digit numeric code, uniform in [100000, 999999]
    pub fn generate() -> String {
        let mut rng = rand::rng();
        rng.random_range(100_000..=999_999).to_string()
    }
}
