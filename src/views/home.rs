//! Dashboard page

use crate::dataset::ReferenceStats;
use crate::forms::{FormErrors, ObservationForm};
use crate::inference::format_decimal;
use crate::middleware::session::Visitor;
use crate::models::{ChildObservation, PredictionHistory};
use super::{escape_html, form::observation_fields, layout, verdict_badge};

/// Everything the dashboard shows
pub struct HomePage<'a> {
    pub visitor: &'a Visitor,
    pub form: &'a ObservationForm,
    pub errors: &'a FormErrors,
    pub observations: &'a [ChildObservation],
    pub history: &'a [PredictionHistory],
    pub reference: &'a ReferenceStats,
    pub accuracy_label: &'a str,
}

impl<'a> HomePage<'a> {
    pub fn render(&self) -> String {
        let content = format!(
            r#"{stats}
            <section class="card">
                <h2>관찰 기록 입력</h2>
                <form method="post" action="/">
                    <div class="grid">{fields}</div>
                    <p><button type="submit">예측 후 저장</button></p>
                </form>
            </section>
            <section class="card">
                <h2>예측 확률</h2>
                {chart}
            </section>
            <section class="card">
                <h2>관찰 목록</h2>
                {observations}
                <form method="post" action="/reset" onsubmit="return confirm('누적된 관찰과 예측 기록을 모두 삭제할까요?');">
                    <p><button type="submit" class="danger">누적 기록 초기화</button></p>
                </form>
            </section>"#,
            stats = self.render_stats(),
            fields = observation_fields(self.form, self.errors),
            chart = self.render_chart(),
            observations = self.render_observations(),
        );

        layout("대시보드", self.visitor, &content)
    }

    fn render_stats(&self) -> String {
        let flagged = self.observations.iter().filter(|o| o.is_danger).count();

        let cards = [
            ("전체 아동 수", self.reference.total_kids.to_string()),
            ("과거 신고 이력 아동", self.reference.danger_kids.to_string()),
            ("모델", self.accuracy_label.to_string()),
            ("누적 관찰", self.observations.len().to_string()),
            ("위험 판정", flagged.to_string()),
        ];

        let cards: String = cards
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<div class="card stat"><div class="label">{}</div><div class="value">{}</div></div>"#,
                    label,
                    escape_html(value)
                )
            })
            .collect();

        format!(r#"<section class="grid">{}</section>"#, cards)
    }

    fn render_chart(&self) -> String {
        if self.history.is_empty() {
            return r#"<p class="muted">아직 예측 기록이 없습니다.</p>"#.to_string();
        }

        self.history
            .iter()
            .map(|entry| {
                let class = if entry.is_danger() { "bar danger" } else { "bar" };
                let (width, label) = match entry.predicted_prob {
                    Some(prob) => (prob.clamp(0.0, 100.0), format!("{}%", format_decimal(prob))),
                    None => (0.0, "-".to_string()),
                };
                format!(
                    r#"<div class="bar-row">
                        <span class="name">{name}</span>
                        <div class="{class}" style="width: {width}%"></div>
                        <span>{result} {label}</span>
                    </div>"#,
                    name = escape_html(&entry.child_name),
                    class = class,
                    width = width,
                    result = escape_html(&entry.predicted_result),
                    label = label,
                )
            })
            .collect()
    }

    fn render_observations(&self) -> String {
        if self.observations.is_empty() {
            return r#"<p class="muted">저장된 관찰이 없습니다.</p>"#.to_string();
        }

        let rows: String = self
            .observations
            .iter()
            .map(|o| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&o.child_name),
                    o.age,
                    escape_html(&o.gender),
                    escape_html(&o.attendance),
                    escape_html(&o.negative_language),
                    escape_html(&o.parental_aggression),
                    escape_html(&o.contact_reaction),
                    o.sibling,
                    escape_html(&o.income_level),
                    escape_html(&o.emotional_state),
                    verdict_badge(o.is_danger),
                    o.observation_date.format("%Y-%m-%d %H:%M"),
                )
            })
            .collect();

        format!(
            r#"<table>
                <thead><tr>
                    <th>이름</th><th>나이</th><th>성별</th><th>출석</th><th>부정 언어</th>
                    <th>보호자 공격성</th><th>신체 접촉</th><th>형제자매</th><th>소득</th>
                    <th>보호자 정서</th><th>예측</th><th>관찰일</th>
                </tr></thead>
                <tbody>{}</tbody>
            </table>"#,
            rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn observation(name: &str, is_danger: bool) -> ChildObservation {
        ChildObservation {
            id: 1,
            child_name: name.to_string(),
            age: 5,
            gender: "남아".to_string(),
            attendance: "정상".to_string(),
            negative_language: "낮음".to_string(),
            parental_aggression: "없음".to_string(),
            contact_reaction: "선호".to_string(),
            sibling: 1,
            income_level: "중간".to_string(),
            emotional_state: "안정".to_string(),
            is_danger,
            observation_date: Utc.with_ymd_and_hms(2025, 3, 26, 9, 30, 0).unwrap(),
        }
    }

    fn history(name: &str, result: &str, prob: Option<f64>) -> PredictionHistory {
        PredictionHistory {
            id: 1,
            child_name: name.to_string(),
            predicted_result: result.to_string(),
            predicted_prob: prob,
            created_at: Utc.with_ymd_and_hms(2025, 3, 26, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_dashboard() {
        let observations = vec![observation("<윤아>", true), observation("도현", false)];
        let history = vec![history("윤아", "위험", Some(85.0)), history("도현", "정상", None)];
        let reference = ReferenceStats {
            total_kids: 500,
            danger_kids: 73,
            ..Default::default()
        };

        let html = HomePage {
            visitor: &Visitor::default(),
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            observations: &observations,
            history: &history,
            reference: &reference,
            accuracy_label: "정확도: 87.34%",
        }
        .render();

        assert!(html.contains("&lt;윤아&gt;"));
        assert!(html.contains(">500<"));
        assert!(html.contains(">73<"));
        assert!(html.contains("정확도: 87.34%"));
        assert!(html.contains("width: 85%"));
        assert!(html.contains("위험 85.0%"));
        assert!(html.contains("정상 -"));
        assert!(html.contains("2025-03-26 09:30"));
        assert!(html.contains("action=\"/reset\""));
    }

    #[test]
    fn test_empty_dashboard() {
        let html = HomePage {
            visitor: &Visitor::default(),
            form: &ObservationForm::default(),
            errors: &FormErrors::default(),
            observations: &[],
            history: &[],
            reference: &ReferenceStats::default(),
            accuracy_label: "정확도: 90.0%",
        }
        .render();

        assert!(html.contains("아직 예측 기록이 없습니다."));
        assert!(html.contains("저장된 관찰이 없습니다."));
    }
}
