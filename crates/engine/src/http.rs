//! 공용 HTTP 헬퍼
//!
//! 레지스트리, 어드바이저리, 체인지로그 조회가 같은 방식으로 클라이언트를 만들고
//! 실패를 [`ScanError::RegistryFetch`]로 변환하도록 모아 둔 함수들입니다.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ScanError;

/// 타임아웃과 User-Agent가 설정된 reqwest 클라이언트를 생성합니다.
pub fn build_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client, ScanError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ScanError::Config {
            field: "http_client".to_owned(),
            reason: e.to_string(),
        })
}

/// GET 요청 후 JSON 본문을 역직렬화합니다.
///
/// 2xx 이외의 상태 코드는 에러로 취급합니다.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, ScanError> {
    let response = send(client.get(url), url).await?;
    response.json::<T>().await.map_err(|e| fetch_error(url, e))
}

/// GET 요청 후 텍스트 본문을 반환합니다.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, ScanError> {
    let response = send(client.get(url), url).await?;
    response.text().await.map_err(|e| fetch_error(url, e))
}

/// 요청을 보내고 상태 코드를 검사합니다.
pub async fn send(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<reqwest::Response, ScanError> {
    let response = request.send().await.map_err(|e| fetch_error(url, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::RegistryFetch {
            url: url.to_owned(),
            reason: format!("HTTP {}", status.as_u16()),
        });
    }
    Ok(response)
}

fn fetch_error(url: &str, err: reqwest::Error) -> ScanError {
    let reason = if err.is_timeout() {
        "request timed out".to_owned()
    } else {
        err.to_string()
    };
    ScanError::RegistryFetch {
        url: url.to_owned(),
        reason,
    }
}
