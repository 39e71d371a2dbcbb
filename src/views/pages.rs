//! Static pages: landing and bulk upload

use crate::dataset::bulk::REQUIRED_COLUMNS;
use crate::middleware::session::Visitor;
use super::{escape_html, layout};

pub fn index(visitor: &Visitor) -> String {
    let content = r#"<section class="card">
        <h1>아동 관찰 위험 예측</h1>
        <p>어린이집 관찰 기록을 입력하면 학습된 랜덤 포레스트 모델이 학대 위험 여부를 예측합니다.</p>
        <ul>
            <li><a href="/">대시보드</a>: 관찰 입력, 예측 확률, 누적 관찰 목록</li>
            <li><a href="/predict">단건 예측</a>: 입력값과 전체 평균 비교</li>
            <li><a href="/bulk">일괄 업로드</a>: CSV 파일로 관찰 기록 등록</li>
        </ul>
    </section>"#;

    layout("소개", visitor, content)
}

/// CSV upload form, optionally with the reason the last upload failed
pub fn bulk_upload(visitor: &Visitor, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<div class="flash error">{}</div>"#, escape_html(e)))
        .unwrap_or_default();

    let content = format!(
        r#"<section class="card">
            <h2>CSV 일괄 업로드</h2>
            {error}
            <p class="muted">필수 열: {required}</p>
            <p class="muted">선택 열: 신체접촉반응, 형제자매수, 소득수준, 보호자정서상태, is_danger</p>
            <form method="post" action="/upload" enctype="multipart/form-data">
                <input type="file" name="csv_file" accept=".csv" required>
                <button type="submit">업로드</button>
            </form>
        </section>"#,
        error = error,
        required = REQUIRED_COLUMNS.join(", "),
    );

    layout("일괄 업로드", visitor, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_upload_page() {
        let html = bulk_upload(&Visitor::default(), Some("line 3: <bad>"));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("아동이름, 나이, 성별"));
        assert!(html.contains("line 3: &lt;bad&gt;"));

        assert!(!bulk_upload(&Visitor::default(), None).contains("flash error"));
    }

    #[test]
    fn test_index_links() {
        let html = index(&Visitor::default());
        assert!(html.contains("href=\"/bulk\""));
    }
}
