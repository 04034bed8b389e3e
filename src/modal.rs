use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use eframe::egui;

use crate::render::{HEADING, LOADING_TEXT, MAIL_LEAD};
use crate::tou::{DisplayBlock, GateState, PendingFetch, RenderedSection, TouGate};

/// What the window reports back once it closes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModalOutcome {
    pub accepted: bool,
    pub version: Option<i64>,
}

pub struct TouModal {
    gate: TouGate,
    pending: Option<PendingFetch>,
    bullet: char,
    outcome: Rc<Cell<ModalOutcome>>,
    closing: bool,
}

impl TouModal {
    pub fn new(gate: TouGate, pending: PendingFetch, bullet: char) -> Self {
        Self {
            gate,
            pending: Some(pending),
            bullet,
            outcome: Rc::new(Cell::new(ModalOutcome::default())),
            closing: false,
        }
    }

    /// Runs the window until the user accepts or closes it.
    pub fn show(self, title: &str) -> Result<ModalOutcome> {
        let outcome = self.outcome.clone();
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([560.0, 680.0])
                .with_min_inner_size([420.0, 420.0])
                .with_title(title)
                .with_resizable(true),
            ..Default::default()
        };

        eframe::run_native(
            title,
            options,
            Box::new(|cc| {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
                Ok(Box::new(self))
            }),
        )
        .map_err(|e| anyhow::anyhow!("Failed to open Terms of Use window: {}", e))?;

        Ok(outcome.get())
    }

    fn poll_fetch(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        if let Some(result) = pending.poll() {
            self.gate.resolve(result);
            self.pending = None;
        }
    }

    fn click_accept(&mut self, ctx: &egui::Context) {
        let version = self.gate.document_version();
        if self.gate.accept() {
            log::info!("[Modal] Terms accepted (version {:?})", version);
            self.outcome.set(ModalOutcome {
                accepted: true,
                version,
            });
            self.close(ctx);
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.closing = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

impl eframe::App for TouModal {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetch();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(HEADING);
            });
            ui.add_space(8.0);
            ui.separator();
            ui.add_space(8.0);

            match self.gate.state() {
                GateState::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(LOADING_TEXT);
                    });
                }
                GateState::Failed(message) => {
                    let message = message.clone();
                    ui.colored_label(egui::Color32::RED, format!("Error: {}", message));
                    ui.add_space(12.0);
                    if ui.button("Continue Anyway").clicked() {
                        self.click_accept(ctx);
                    }
                }
                GateState::Loaded(loaded) => {
                    let agreement_text = loaded.agreement_text.clone();
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, true])
                        .max_height((ui.available_height() - 90.0).max(120.0))
                        .show(ui, |ui| {
                            for section in &loaded.sections {
                                show_section(ui, section, self.bullet);
                            }
                        });

                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);

                    let mut agreed = self.gate.agreed();
                    if ui.checkbox(&mut agreed, agreement_text).changed() {
                        self.gate.set_agreed(agreed);
                    }

                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("I Decline").clicked() {
                            log::info!("[Modal] Terms declined");
                            self.close(ctx);
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let enabled = self.gate.can_accept();
                            if ui
                                .add_enabled(enabled, egui::Button::new("Accept and Continue"))
                                .clicked()
                            {
                                self.click_accept(ctx);
                            }
                        });
                    });
                }
            }
        });

        if self.pending.is_some() && !self.closing {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn show_section(ui: &mut egui::Ui, section: &RenderedSection, bullet: char) {
    ui.label(egui::RichText::new(&section.title).strong().size(18.0));
    ui.add_space(4.0);

    for block in &section.blocks {
        match block {
            DisplayBlock::Paragraph(text) => {
                ui.label(text.as_str());
            }
            DisplayBlock::BoldParagraph(text) => {
                ui.label(egui::RichText::new(text).strong());
            }
            DisplayBlock::MailLink(address) => {
                ui.horizontal_wrapped(|ui| {
                    ui.label(MAIL_LEAD);
                    ui.hyperlink_to(address.as_str(), format!("mailto:{}", address));
                });
            }
            DisplayBlock::BulletList(items) => {
                ui.indent(("bullets", section.title.as_str(), items.len()), |ui| {
                    for item in items {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(bullet.to_string());
                            ui.label(item.as_str());
                        });
                    }
                });
            }
        }
        ui.add_space(4.0);
    }
    ui.add_space(10.0);
}
