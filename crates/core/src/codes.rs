//! 업무 코드 및 전송 상태 상수
//!
//! 성공 코드는 현재 규약(200)과 레거시 규약(0)을 모두 허용합니다.

/// 업무 성공 코드 (현재 규약)
pub const SUCCESS: i64 = 200;

/// 업무 성공 코드 (레거시 규약)
pub const LEGACY_SUCCESS: i64 = 0;

/// 성공으로 인정하는 업무 코드 집합
pub const SUCCESS_CODES: [i64; 2] = [SUCCESS, LEGACY_SUCCESS];

/// 사용자명 중복
pub const USER_EXISTS: i64 = 1001;

/// 잘못된 자격 증명
pub const WRONG_CREDENTIALS: i64 = 1002;

/// 파라미터 오류
pub const BAD_REQUEST: i64 = 400;

/// 인증 실패
pub const UNAUTHORIZED: i64 = 401;

/// 리소스 없음
pub const NOT_FOUND: i64 = 404;

/// 서버 내부 오류
pub const INTERNAL_ERROR: i64 = 500;

/// 전송 상태: 성공
pub const STATUS_OK: u16 = 200;

/// 전송 상태: 잘못된 요청
pub const STATUS_BAD_REQUEST: u16 = 400;

/// 전송 상태: 인증 실패
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// 전송 상태: 리소스 없음
pub const STATUS_NOT_FOUND: u16 = 404;

/// 인증 실패로 인정하는 전송 상태
pub const AUTH_FAILURE_STATUSES: [u16; 2] = [401, 403];

/// "이미 존재함" 메시지 후보 (현지화 문구 / 영문)
pub const ALREADY_EXISTS_MESSAGES: [&str; 2] = ["已存在", "already exists"];
