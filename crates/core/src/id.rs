//! 식별자 생성 — 사람이 옮겨 적기 쉬운 충돌 회피 ID
//!
//! 유닛/카톤/자격증명 ID를 생성합니다. 시각적으로 혼동되는 문자
//! (0/O, 1/I)를 제외한 32-심볼 알파벳을 사용하여 엔트로피 밀도보다
//! 전사 정확성을 우선합니다.
//!
//! 생성 시점에 유일성 검사는 하지 않습니다. 유일성은 스토어가
//! 충돌하는 삽입을 [`StoreError::DuplicateId`](crate::error::StoreError)로
//! 거부하는 것으로 확립되며, 호출자는 재시도 계약을 따라야 합니다.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

/// ID용 알파벳 — 대문자, 0/O/1/I 제외 (32 심볼)
pub const ID_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 패스프레이즈용 알파벳 — 소문자, l/o/0/1 제외 (32 심볼)
pub const SECRET_ALPHABET: &str = "abcdefghijkmnpqrstuvwxyz23456789";

/// 유닛 ID 접두어
pub const UNIT_PREFIX: &str = "MED";
/// 카톤 ID 접두어
pub const CARTON_PREFIX: &str = "CTN";
/// 배치 ID 접두어
pub const BATCH_PREFIX: &str = "BATCH";
/// 유통사 자격증명 접두어
pub const DISTRIBUTOR_PREFIX: &str = "DIST";
/// 제조사 자격증명 접두어
pub const MANUFACTURER_PREFIX: &str = "MFG";
/// 약국 면허 접두어
pub const PHARMACY_PREFIX: &str = "LIC";

/// 그룹당 문자 수
const GROUP_LEN: usize = 4;
/// 전체 그룹 수
const GROUP_COUNT: usize = 4;

static WELL_FORMED: LazyLock<Regex> = LazyLock::new(|| {
    // ID_ALPHABET과 정확히 일치하는 문자 클래스 (I, O, 0, 1 제외)
    Regex::new(r"^[A-Z]{2,5}(-[A-HJ-NP-Z2-9]{4}){4}$").expect("static identifier pattern")
});

/// `PREFIX-XXXX-XXXX-XXXX-XXXX` 형식의 식별자를 생성합니다.
pub fn generate(prefix: &str) -> String {
    generate_with(&mut rand::thread_rng(), prefix)
}

/// 호출자가 제공한 난수 소스로 식별자를 생성합니다.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let alphabet = ID_ALPHABET.as_bytes();
    let mut out = String::with_capacity(prefix.len() + GROUP_COUNT * (GROUP_LEN + 1));
    out.push_str(prefix);
    for _ in 0..GROUP_COUNT {
        out.push('-');
        for _ in 0..GROUP_LEN {
            out.push(alphabet[rng.gen_range(0..alphabet.len())] as char);
        }
    }
    out
}

/// 대문자 짧은 코드를 생성합니다 (자격증명 ID 접미어용).
pub fn short_code(len: usize) -> String {
    short_code_with(&mut rand::thread_rng(), len)
}

/// 호출자가 제공한 난수 소스로 짧은 코드를 생성합니다.
pub fn short_code_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let alphabet = ID_ALPHABET.as_bytes();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// 소문자 패스프레이즈를 생성합니다.
pub fn credential_secret(len: usize) -> String {
    credential_secret_with(&mut rand::thread_rng(), len)
}

/// 호출자가 제공한 난수 소스로 패스프레이즈를 생성합니다.
pub fn credential_secret_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let alphabet = SECRET_ALPHABET.as_bytes();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// `BATCH-XXXX` 형식의 배치 ID를 생성합니다.
pub fn batch_id() -> String {
    format!("{}-{}", BATCH_PREFIX, short_code(GROUP_LEN))
}

/// 문자열이 4-그룹 식별자 형식인지 검사합니다.
///
/// CLI 입력 선별용입니다. 스캔 프로세서는 이 검사 없이
/// 스토어 조회 결과만으로 미등록 식별자를 판정합니다.
pub fn is_well_formed(id: &str) -> bool {
    WELL_FORMED.is_match(id)
}
