mod config;
mod gemini;
mod history;
mod markdown;
mod search;

use iced::{
    alignment, time,
    widget::{
        button, column, container, horizontal_rule, progress_bar, row, scrollable, text,
        text_input, text_input::Id, Column, Row,
    },
    window, Element, Font, Length, Size, Subscription, Task, Theme,
};
use std::sync::Arc;
use std::time::Duration;

use history::HistoryStore;
use markdown::{Block, ParsedContent, ParsedTable};
use search::{ComparisonResult, DeliveryOption, GroundingChunk, SearchFilters};

const LOADING_INTERVAL: Duration = Duration::from_millis(2500);

const LOADING_STEPS: [&str; 7] = [
    "Establishing encrypted connection to retailer hubs...",
    "Crawling Amazon.in for live pricing data...",
    "Scanning Flipkart.com review databases...",
    "Aggregating Myntra.com logistics availability...",
    "Calculating optimal delivery routes for your sector...",
    "Applying deal-matching algorithms...",
    "Finalizing top 3 product comparison...",
];

fn main() -> iced::Result {
    let config = config::Config::load();

    iced::application("SmartShop", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size: Size::new(config.window.width as f32, config.window.height as f32),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(App::new)
}

#[derive(Debug, Clone)]
enum Message {
    ProductNameChanged(String),
    BrandChanged(String),
    BudgetChanged(String),
    PincodeChanged(String),
    DeliverySelected(DeliveryOption),
    Submit,
    SearchCompleted(ComparisonResult),
    SearchFailed(String),
    Tick,
    RecallSearch(usize),
    OpenSource(String),
}

struct App {
    filters: SearchFilters,
    // Filters that produced the in-flight request; recorded to history only
    // once that request succeeds.
    pending: Option<SearchFilters>,
    is_loading: bool,
    loading_step: usize,
    result: Option<ComparisonResult>,
    error: Option<String>,
    history: HistoryStore,
    client: Arc<gemini::GeminiClient>,
    product_input_id: Id,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let config = config::Config::load();

        let api_key = config.api_key().unwrap_or_else(|| {
            eprintln!("Warning: no Gemini API key configured (config.toml or GEMINI_API_KEY); searches will fail.");
            String::new()
        });

        let client = gemini::GeminiClient::with_config(
            config.gemini.base_url,
            config.gemini.model,
            api_key,
        );

        let product_input_id = Id::unique();

        let app = App {
            filters: SearchFilters::default(),
            pending: None,
            is_loading: false,
            loading_step: 0,
            result: None,
            error: None,
            history: HistoryStore::load(config::Config::history_path()),
            client: Arc::new(client),
            product_input_id: product_input_id.clone(),
        };

        (app, text_input::focus(product_input_id))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ProductNameChanged(value) => {
                self.filters.product_name = value;
                Task::none()
            }
            Message::BrandChanged(value) => {
                self.filters.brand = value;
                Task::none()
            }
            Message::BudgetChanged(value) => {
                self.filters.budget_range = value;
                Task::none()
            }
            Message::PincodeChanged(value) => {
                self.filters.pincode = value;
                Task::none()
            }
            Message::DeliverySelected(option) => {
                self.filters.delivery_option = option;
                Task::none()
            }
            Message::Submit => {
                if self.is_loading || !self.can_submit() {
                    return Task::none();
                }

                let filters = self.filters.clone();
                self.pending = Some(filters.clone());
                self.is_loading = true;
                self.loading_step = 0;
                self.error = None;
                self.result = None;

                let client = self.client.clone();

                Task::future(async move {
                    match client.search(&filters).await {
                        Ok(result) => Message::SearchCompleted(result),
                        Err(e) => Message::SearchFailed(format!("{:#}", e)),
                    }
                })
            }
            Message::SearchCompleted(result) => {
                self.result = Some(result);
                self.is_loading = false;
                if let Some(filters) = self.pending.take() {
                    self.history.record(filters);
                }
                Task::none()
            }
            Message::SearchFailed(error) => {
                self.error = Some(error);
                self.is_loading = false;
                self.pending = None;
                Task::none()
            }
            Message::Tick => {
                if self.is_loading {
                    self.loading_step = (self.loading_step + 1) % LOADING_STEPS.len();
                }
                Task::none()
            }
            Message::RecallSearch(index) => {
                if let Some(entry) = self.history.entries().get(index) {
                    self.filters = entry.filters.clone();
                }
                Task::none()
            }
            Message::OpenSource(uri) => {
                if let Err(e) = webbrowser::open(&uri) {
                    eprintln!("Failed to open {}: {}", uri, e);
                }
                Task::none()
            }
        }
    }

    fn can_submit(&self) -> bool {
        !self.filters.product_name.trim().is_empty() && !self.filters.pincode.trim().is_empty()
    }

    fn subscription(&self) -> Subscription<Message> {
        // The step timer only exists while a search is in flight, so it can
        // never outlive the loading state.
        if self.is_loading {
            time::every(LOADING_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn view(&self) -> Element<Message> {
        let content = column![self.form_view(), self.results_view()]
            .spacing(24)
            .padding(24)
            .max_width(900);

        scrollable(
            container(content)
                .width(Length::Fill)
                .align_x(alignment::Horizontal::Center),
        )
        .height(Length::Fill)
        .into()
    }

    fn form_view(&self) -> Element<Message> {
        let product = labeled(
            "Search Query",
            text_input("What are you looking for?", &self.filters.product_name)
                .on_input(Message::ProductNameChanged)
                .on_submit(Message::Submit)
                .padding(10)
                .id(self.product_input_id.clone()),
        );

        let brand = labeled(
            "Brand Filter",
            text_input("Specific brand preference?", &self.filters.brand)
                .on_input(Message::BrandChanged)
                .padding(10),
        );

        let budget = labeled(
            "Maximum Budget",
            text_input("e.g. Under ₹20,000", &self.filters.budget_range)
                .on_input(Message::BudgetChanged)
                .padding(10),
        );

        let pincode = labeled(
            "Delivery Pin Code",
            text_input("Enter 6-digit pin", &self.filters.pincode)
                .on_input(Message::PincodeChanged)
                .on_submit(Message::Submit)
                .padding(10),
        );

        let mut delivery = Row::new().spacing(10);
        for option in DeliveryOption::ALL {
            let style = if self.filters.delivery_option == option {
                button::primary
            } else {
                button::secondary
            };
            delivery = delivery.push(
                button(text(option.label()).size(13))
                    .style(style)
                    .padding(8)
                    .on_press(Message::DeliverySelected(option)),
            );
        }

        let submit_label = if self.is_loading {
            "Scanning..."
        } else {
            "Compare Products"
        };
        let mut submit = button(
            text(submit_label)
                .size(16)
                .width(Length::Fill)
                .align_x(alignment::Horizontal::Center),
        )
        .padding(12)
        .width(Length::Fill);
        if !self.is_loading && self.can_submit() {
            submit = submit.on_press(Message::Submit);
        }

        let mut form = column![
            row![product, brand].spacing(16),
            row![budget, pincode].spacing(16),
            labeled_element("Required Delivery Speed", delivery.into()),
            submit,
        ]
        .spacing(16);

        if !self.history.entries().is_empty() {
            let mut chips = Row::new().spacing(8);
            for (index, entry) in self.history.entries().iter().enumerate() {
                chips = chips.push(
                    button(text(entry.filters.product_name.as_str()).size(12))
                        .style(button::text)
                        .padding(6)
                        .on_press(Message::RecallSearch(index)),
                );
            }
            form = form.push(labeled_element("History Buffer", chips.into()));
        }

        form.into()
    }

    fn results_view(&self) -> Element<Message> {
        if let Some(error) = &self.error {
            return container(
                column![
                    text("Search Error").size(14),
                    text(error.as_str()).size(14).style(text::danger),
                ]
                .spacing(6),
            )
            .padding(16)
            .width(Length::Fill)
            .into();
        }

        if self.is_loading {
            return self.loading_view();
        }

        match &self.result {
            Some(result) => self.comparison_view(result),
            None => column![].into(),
        }
    }

    fn loading_view(&self) -> Element<Message> {
        let step = self.loading_step % LOADING_STEPS.len();
        let progress = (step + 1) as f32 / LOADING_STEPS.len() as f32;

        container(
            column![
                text("Status: Deep Scan Active").size(12),
                text(LOADING_STEPS[step]).size(16),
                progress_bar(0.0..=1.0, progress).height(8.0),
                text(format!(
                    "Sector-mapping: {}%",
                    (progress * 100.0).round() as u32
                ))
                .size(11),
            ]
            .spacing(14)
            .align_x(alignment::Horizontal::Center),
        )
        .width(Length::Fill)
        .padding(40)
        .align_x(alignment::Horizontal::Center)
        .into()
    }

    fn comparison_view<'a>(&'a self, result: &'a ComparisonResult) -> Element<'a, Message> {
        // The summary is re-parsed on every view; it is cheap and keeps the
        // parse output from ever going stale relative to the result.
        let body: Element<Message> = match markdown::parse_summary(&result.summary) {
            ParsedContent::Table(table) => {
                let prose = blocks_view(markdown::render_blocks(&table.remaining_text));
                column![table_view(table), horizontal_rule(1), prose]
                    .spacing(16)
                    .into()
            }
            ParsedContent::PlainText(plain) => blocks_view(markdown::render_blocks(&plain)),
        };

        let mut sections = column![body].spacing(20);
        if result.sources.iter().any(|s| s.web.is_some()) {
            sections = sections.push(sources_view(&result.sources));
        }
        sections.into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

fn labeled<'a>(
    label: &'a str,
    input: text_input::TextInput<'a, Message>,
) -> Element<'a, Message> {
    labeled_element(label, input.into())
}

fn labeled_element<'a>(label: &'a str, content: Element<'a, Message>) -> Element<'a, Message> {
    column![text(label).size(12), content]
        .spacing(6)
        .width(Length::Fill)
        .into()
}

fn table_view(table: ParsedTable) -> Element<'static, Message> {
    let mut header = Row::new().spacing(12);
    for heading in table.headers {
        header = header.push(text(heading).size(13).width(Length::FillPortion(1)));
    }

    let mut grid = Column::new().spacing(8).push(header).push(horizontal_rule(1));

    // Rows keep whatever cell count the model produced; short or long rows
    // are rendered as-is.
    for cells in table.rows {
        let mut data_row = Row::new().spacing(12);
        for cell in cells {
            data_row = data_row.push(text(cell).size(14).width(Length::FillPortion(1)));
        }
        grid = grid.push(data_row);
    }

    grid.into()
}

fn blocks_view(blocks: Vec<Block>) -> Element<'static, Message> {
    let mut prose = Column::new().spacing(10);
    for block in blocks {
        let element: Element<Message> = match block {
            Block::Heading { level, text: title } => {
                let size = match level {
                    1 => 24,
                    2 => 20,
                    _ => 17,
                };
                text(title).size(size).into()
            }
            Block::Bullet(item) => row![text("» ").size(14), text(item).size(14)]
                .spacing(4)
                .into(),
            Block::Paragraph(body) => text(body).size(14).into(),
        };
        prose = prose.push(element);
    }
    prose.into()
}

fn sources_view(sources: &[GroundingChunk]) -> Element<Message> {
    let mut list = Column::new().spacing(6);
    for chunk in sources {
        let Some(web) = &chunk.web else { continue };
        let title = if web.title.is_empty() {
            web.uri.clone()
        } else {
            web.title.clone()
        };
        list = list.push(
            button(
                column![text(host_of(&web.uri)).size(11), text(title).size(13)].spacing(2),
            )
            .style(button::text)
            .padding(6)
            .on_press(Message::OpenSource(web.uri.clone())),
        );
    }

    column![text("Purchase Access Nodes").size(13), list]
        .spacing(8)
        .into()
}

fn host_of(uri: &str) -> String {
    let rest = uri
        .strip_prefix("https://")
        .or_else(|| uri.strip_prefix("http://"))
        .unwrap_or(uri);
    let host = rest.split('/').next().unwrap_or(rest);
    host.strip_prefix("www.").unwrap_or(host).to_string()
}
